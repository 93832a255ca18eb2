//! Chronicle Core - shared data model and infrastructure
//!
//! Defines the research data types, the error taxonomy, settings, logging and the
//! collaborator traits used by the rest of the workspace

pub mod async_utils;
pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use async_utils::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
