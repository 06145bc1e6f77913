//! Configuration types and CLI options.
//!
//! `Config` is what the command line parses into. `validate()` turns it into
//! `HarvestSettings`, the immutable values the harvesting core runs on.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_PORTS, DEFAULT_PUBLIC_RESOLVERS, DEFAULT_THREADS, DNS_TIMEOUT, TLS_CONNECT_TIMEOUT,
    TLS_HANDSHAKE_DEADLINE,
};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// How harvested names are written to the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One name per line
    Plain,
    /// One JSON object per hostname: `{"host": ..., "names": [...]}`
    Jsonl,
}

/// Command-line configuration.
///
/// Can also be built programmatically through `Default`:
///
/// ```no_run
/// use cert_harvest::Config;
///
/// let config = Config {
///     ports: "443,8443".to_string(),
///     threads: 20,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cert_harvest",
    version,
    about = "Discover related hostnames from the names in TLS certificates"
)]
pub struct Config {
    /// File to read hostnames from, one per line (`-` reads stdin)
    #[arg(default_value = "-")]
    pub file: PathBuf,

    /// Ports to connect to, separated with commas
    #[arg(short = 'p', long, default_value = DEFAULT_PORTS)]
    pub ports: String,

    /// Number of concurrent workers
    #[arg(short = 't', long, default_value_t = DEFAULT_THREADS)]
    pub threads: usize,

    /// TCP connect timeout (including DNS resolution) in milliseconds
    #[arg(long, default_value_t = TLS_CONNECT_TIMEOUT.as_millis() as u64)]
    pub connect_timeout_ms: u64,

    /// TLS handshake deadline in milliseconds
    #[arg(long, default_value_t = TLS_HANDSHAKE_DEADLINE.as_millis() as u64)]
    pub handshake_timeout_ms: u64,

    /// Do not send the hostname as SNI during the handshake
    #[arg(long)]
    pub no_sni: bool,

    /// Print each name only the first time it is seen in this run
    #[arg(long)]
    pub unique: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output_format: OutputFormat,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Log per-error-type counts when the run finishes
    #[arg(long)]
    pub show_stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from("-"),
            ports: DEFAULT_PORTS.to_string(),
            threads: DEFAULT_THREADS,
            connect_timeout_ms: TLS_CONNECT_TIMEOUT.as_millis() as u64,
            handshake_timeout_ms: TLS_HANDSHAKE_DEADLINE.as_millis() as u64,
            no_sni: false,
            unique: false,
            output_format: OutputFormat::Plain,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Plain,
            show_stats: false,
        }
    }
}

/// Per-port connection policy shared by every worker.
#[derive(Debug, Clone, Copy)]
pub struct FetchSettings {
    /// Bounds DNS resolution plus TCP connect
    pub connect_timeout: Duration,
    /// Bounds the TLS handshake
    pub handshake_deadline: Duration,
    /// Per-query DNS timeout
    pub dns_timeout: Duration,
    /// Send the hostname as SNI
    pub enable_sni: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: TLS_CONNECT_TIMEOUT,
            handshake_deadline: TLS_HANDSHAKE_DEADLINE,
            dns_timeout: DNS_TIMEOUT,
            enable_sni: true,
        }
    }
}

/// Validated, immutable settings for one harvesting run.
#[derive(Debug, Clone)]
pub struct HarvestSettings {
    /// Ports tried for every hostname, in order
    pub ports: Arc<[u16]>,
    /// Number of concurrent workers
    pub workers: usize,
    /// Connection policy
    pub fetch: FetchSettings,
    /// DNS servers the pool resolver picks from
    pub resolvers: Vec<SocketAddr>,
    /// Suppress names already written earlier in the run
    pub unique: bool,
    /// Output format
    pub output_format: OutputFormat,
    /// Log error statistics at the end of the run
    pub show_stats: bool,
}

impl Config {
    /// Validates the configuration and converts it into `HarvestSettings`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an empty or malformed port list, zero workers,
    /// or a zero timeout. Nothing is dispatched when this fails.
    pub fn validate(&self) -> Result<HarvestSettings, ConfigError> {
        let ports = parse_ports(&self.ports)?;

        if self.threads == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("connect"));
        }
        if self.handshake_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("handshake"));
        }

        Ok(HarvestSettings {
            ports,
            workers: self.threads,
            fetch: FetchSettings {
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                handshake_deadline: Duration::from_millis(self.handshake_timeout_ms),
                dns_timeout: DNS_TIMEOUT,
                enable_sni: !self.no_sni,
            },
            resolvers: parse_resolvers(DEFAULT_PUBLIC_RESOLVERS)?,
            unique: self.unique,
            output_format: self.output_format,
            show_stats: self.show_stats,
        })
    }
}

/// Parses a comma-separated port list such as `"443,8443"`.
pub(crate) fn parse_ports(raw: &str) -> Result<Arc<[u16]>, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::EmptyPortList);
    }

    raw.split(',')
        .map(|part| {
            let part = part.trim();
            match part.parse::<u16>() {
                Ok(port) if port != 0 => Ok(port),
                _ => Err(ConfigError::InvalidPort(part.to_string())),
            }
        })
        .collect()
}

/// Parses `host:port` resolver addresses.
pub(crate) fn parse_resolvers(raw: &[&str]) -> Result<Vec<SocketAddr>, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::EmptyResolverPool);
    }
    raw.iter()
        .map(|addr| {
            addr.parse::<SocketAddr>()
                .map_err(|_| ConfigError::InvalidResolver((*addr).to_string()))
        })
        .collect()
}
