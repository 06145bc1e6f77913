//! Configuration constants.
//!
//! Timeouts, pool sizes and the built-in resolver list used as defaults
//! throughout the harvester.

use std::time::Duration;

/// Ports tried when none are given on the command line.
pub const DEFAULT_PORTS: &str = "443";

/// Number of concurrent workers when none is given.
pub const DEFAULT_THREADS: usize = 5;

/// The job queue holds `workers * QUEUE_CAPACITY_FACTOR` hostnames.
/// A full queue blocks the reader until a worker frees a slot.
pub const QUEUE_CAPACITY_FACTOR: usize = 2;

/// Seconds between progress log lines.
pub const LOGGING_INTERVAL: u64 = 5;

// Network operation timeouts
/// Bounds DNS resolution plus TCP connect for one port.
pub const TLS_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
/// Bounds the TLS handshake for one port.
pub const TLS_HANDSHAKE_DEADLINE: Duration = Duration::from_secs(3);
/// Per-query timeout applied inside the pool resolver (single attempt).
pub const DNS_TIMEOUT: Duration = Duration::from_secs(1);

/// Public DNS servers queried instead of the system resolver.
///
/// Verisign secondary, Quad9, DNS.WATCH, Comodo, SafeDNS, OpenNIC, Dyn, FreeDNS,
/// Neustar and UncensoredDNS were left out as unreliable. OpenDNS flags scanning
/// traffic, and Alternate DNS has returned fake answers.
pub const DEFAULT_PUBLIC_RESOLVERS: &[&str] = &[
    "1.1.1.1:53",     // Cloudflare
    "8.8.8.8:53",     // Google
    "64.6.64.6:53",   // Verisign
    "77.88.8.8:53",   // Yandex.DNS
    "74.82.42.42:53", // Hurricane Electric
    "1.0.0.1:53",     // Cloudflare Secondary
    "8.8.4.4:53",     // Google Secondary
    "77.88.8.1:53",   // Yandex.DNS Secondary
];
