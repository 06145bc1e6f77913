//! Error handling and processing statistics.
//!
//! This module provides:
//! - Typed errors for configuration, initialization and per-port fetches
//! - Processing statistics (per-port failures and extraction misses)
//!
//! Per-port failures are never propagated past the certificate fetcher. They
//! are logged and counted here. Only `ConfigError` stops a run.

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{ConfigError, ErrorType, FetchError, InitializationError, WarningType};
