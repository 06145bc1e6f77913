//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, ProcessingStats, WarningType};
use crate::models::HarvestReport;

/// Prints a one-line summary of the run.
///
/// Works with both plain and JSON log formats (`log::info!` handles formatting).
pub fn print_summary(report: &HarvestReport) {
    info!(
        "Harvested {} host{} ({} with names, {} failed ports), wrote {} names in {:.1}s",
        report.total_hosts,
        if report.total_hosts == 1 { "" } else { "s" },
        report.hosts_with_names,
        report.failed_ports,
        report.names_written,
        report.elapsed_seconds
    );
}

/// Prints error and warning counts to the log.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    let total_warnings = error_stats.total_warnings();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = error_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_warnings > 0 {
        info!("Warning Counts ({} total):", total_warnings);
        for warning_type in WarningType::iter() {
            let count = error_stats.get_warning_count(warning_type);
            if count > 0 {
                info!("   {}: {}", warning_type.as_str(), count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_error_statistics_no_errors() {
        let stats = ProcessingStats::new();
        print_error_statistics(&stats);
    }

    #[test]
    fn test_print_error_statistics_with_errors_and_warnings() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::TlsHandshakeTimeout);
        stats.increment_error(ErrorType::DnsResolveError);
        stats.increment_warning(WarningType::NoCertificateNames);
        print_error_statistics(&stats);
        assert_eq!(stats.total_errors(), 2);
        assert_eq!(stats.total_warnings(), 1);
    }

    #[test]
    fn test_print_summary() {
        print_summary(&HarvestReport::default());
        print_summary(&HarvestReport {
            total_hosts: 3,
            hosts_with_names: 2,
            failed_ports: 1,
            names_written: 7,
            elapsed_seconds: 1.25,
        });
    }
}
