//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, resolver list, queue sizing)
//! - CLI option types and validation into runtime settings

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub(crate) use types::parse_resolvers;
pub use types::{Config, FetchSettings, HarvestSettings, LogFormat, LogLevel, OutputFormat};
