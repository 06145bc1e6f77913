//! Run-time helpers used around a harvesting run.
//!
//! This module provides input selection, progress logging, shutdown of
//! background tasks, and statistics printing.

pub mod input;
pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use input::{open_input, HostInput};
pub use logging::log_progress;
pub use shutdown::shutdown_gracefully;
pub use statistics::{print_error_statistics, print_summary};
