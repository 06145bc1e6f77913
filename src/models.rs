use serde::Serialize;

/// Names harvested for one hostname across all of its ports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestResult {
    /// The hostname as submitted (trimmed, lower-cased)
    pub host: String,
    /// Discovered names, case-insensitively unique, in first-seen order
    pub names: Vec<String>,
    /// Number of ports whose connect or handshake failed
    #[serde(skip)]
    pub failed_ports: usize,
}

/// Summary of a completed harvesting run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestReport {
    /// Hostnames dispatched to the workers
    pub total_hosts: usize,
    /// Hostnames whose certificates yielded at least one name
    pub hosts_with_names: usize,
    /// Port attempts that failed, summed over all hostnames
    pub failed_ports: usize,
    /// Names written to the output
    pub names_written: usize,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}
