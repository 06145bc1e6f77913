//! Progress logging utilities.

use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Logs how many hostnames have been harvested so far.
///
/// # Arguments
///
/// * `start_time` - The start time of processing
/// * `completed_hosts` - Atomic counter of hostnames whose ports were all tried
pub fn log_progress(start_time: std::time::Instant, completed_hosts: &Arc<AtomicUsize>) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let completed = completed_hosts.load(Ordering::SeqCst);
    let rate = if elapsed_secs > 0.0 {
        completed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Harvested {} hosts in {:.2} seconds (~{:.2} hosts/sec)",
        completed, elapsed_secs, rate
    );
}
