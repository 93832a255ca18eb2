//! Chronicle LLM - completion service over the siumai framework
//!
//! Implements the `LlmProvider` trait for the closed set of providers described by
//! `LlmProviderConfig`.

pub mod client;
pub mod json;

pub use client::*;
pub use json::*;
