//! Tier 2 search backends

pub mod tavily;

pub use tavily::{TavilyConfig, TavilySearch};
