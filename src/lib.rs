//! cert_harvest library: discover related hostnames from TLS certificates
//!
//! For every input hostname, this library connects to a configured list of
//! ports, completes a TLS handshake without verifying the server, and reads
//! the Common Name and DNS Subject Alternative Names of the leaf certificate.
//! Wildcard labels are stripped and names are deduplicated case-insensitively.
//!
//! Hostnames are resolved through a pool of public DNS servers (one picked at
//! random per lookup), never through the operating system's resolver.
//!
//! # Example
//!
//! ```no_run
//! use cert_harvest::{run_harvest, Config};
//! use tokio::io::BufReader;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     ports: "443,8443".to_string(),
//!     threads: 20,
//!     ..Default::default()
//! };
//!
//! let input = BufReader::new(&b"example.com\n"[..]);
//! let report = run_harvest(config, input, tokio::io::stdout()).await?;
//! eprintln!("{} hosts, {} names", report.total_hosts, report.names_written);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod app;
pub mod config;
pub mod dns;
pub mod domain;
pub mod error_handling;
pub mod initialization;
mod models;
mod run;
pub mod tls;

// Re-export public API
pub use app::{open_input, HostInput};
pub use config::{Config, HarvestSettings, LogFormat, LogLevel, OutputFormat};
pub use models::{HarvestReport, HarvestResult};
pub use run::{run_harvest, run_harvest_with_settings, DispatchSummary, Dispatcher};
pub use tls::CertificateFetcher;
