//! Error type definitions.
//!
//! This module defines the typed errors of the harvester and the error/warning
//! kinds counted by `ProcessingStats`.

use std::time::Duration;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error building the TLS client configuration.
    #[error("TLS client initialization error: {0}")]
    TlsConfigError(#[from] rustls::Error),

    /// Error building the DNS resolver pool.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolverError(#[from] ConfigError),
}

/// Invalid top-level configuration. Rejected before any job is dispatched.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No ports were given.
    #[error("Port list is empty, please check your ports input")]
    EmptyPortList,

    /// A port entry is not a number in 1..=65535.
    #[error("Invalid port {0:?}, expected a number between 1 and 65535")]
    InvalidPort(String),

    /// The worker count is zero.
    #[error("Worker count must be at least 1")]
    NoWorkers,

    /// A timeout was configured as zero.
    #[error("The {0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),

    /// The resolver pool has no entries.
    #[error("Resolver pool must contain at least one DNS server")]
    EmptyResolverPool,

    /// A resolver entry is not a `host:port` socket address.
    #[error("Invalid resolver address {0:?}")]
    InvalidResolver(String),
}

/// A failed attempt to obtain a certificate from one `host:port`.
///
/// These never leave the certificate fetcher; they are logged and counted.
#[derive(Error, Debug)]
pub enum FetchError {
    /// DNS resolution failed or returned no addresses.
    #[error("DNS resolution for {host} via {server} failed: {reason}")]
    Resolve {
        /// Hostname being resolved
        host: String,
        /// DNS server the failing query went to
        server: String,
        /// Resolver error text
        reason: String,
    },

    /// Every resolved address refused or failed the TCP connect.
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        /// `host:port` being connected
        addr: String,
        /// Last connect error
        #[source]
        source: std::io::Error,
    },

    /// Resolution plus TCP connect did not finish in time.
    #[error("TCP connection timeout for {addr} ({timeout:?})")]
    ConnectTimeout {
        /// `host:port` being connected
        addr: String,
        /// Configured connect timeout
        timeout: Duration,
    },

    /// The hostname cannot be used as a TLS server name.
    #[error("Invalid server name {0:?}")]
    InvalidServerName(String),

    /// TLS negotiation failed.
    #[error("TLS handshake with {addr} failed: {source}")]
    Handshake {
        /// `host:port` of the handshake
        addr: String,
        /// TLS or I/O error reported by the connector
        #[source]
        source: std::io::Error,
    },

    /// The handshake lost the race against its deadline.
    #[error("Handshake timeout for {addr} ({deadline:?})")]
    HandshakeTimeout {
        /// `host:port` of the handshake
        addr: String,
        /// Configured handshake deadline
        deadline: Duration,
    },

    /// The handshake completed but the peer presented no certificate.
    #[error("No certificate presented by {0}")]
    NoCertificate(String),
}

impl FetchError {
    /// Maps the error onto its statistics counter.
    pub fn error_type(&self) -> ErrorType {
        match self {
            FetchError::Resolve { .. } => ErrorType::DnsResolveError,
            FetchError::Connect { .. } => ErrorType::TcpConnectError,
            FetchError::ConnectTimeout { .. } => ErrorType::TcpConnectTimeout,
            FetchError::InvalidServerName(_) => ErrorType::InvalidServerName,
            FetchError::Handshake { .. } => ErrorType::TlsHandshakeError,
            FetchError::HandshakeTimeout { .. } => ErrorType::TlsHandshakeTimeout,
            FetchError::NoCertificate(_) => ErrorType::NoPeerCertificate,
        }
    }
}

/// Per-port failures counted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Connection errors
    /// DNS resolution failed
    DnsResolveError,
    /// TCP connect refused or failed
    TcpConnectError,
    /// Resolution plus connect exceeded the connect timeout
    TcpConnectTimeout,
    // TLS errors
    /// Hostname unusable as a TLS server name
    InvalidServerName,
    /// TLS negotiation failed
    TlsHandshakeError,
    /// Handshake exceeded its deadline
    TlsHandshakeTimeout,
    /// Handshake completed without a peer certificate
    NoPeerCertificate,
}

/// Extraction misses: the handshake worked but yielded no usable names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    /// Leaf certificate is not valid X.509
    CertificateParseError,
    /// Certificate has neither a usable CN nor DNS SANs
    NoCertificateNames,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    /// Returns a human-readable string representation of the error type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::DnsResolveError => "DNS resolution error",
            ErrorType::TcpConnectError => "TCP connect error",
            ErrorType::TcpConnectTimeout => "TCP connect timeout",
            ErrorType::InvalidServerName => "Invalid TLS server name",
            ErrorType::TlsHandshakeError => "TLS handshake error",
            ErrorType::TlsHandshakeTimeout => "TLS handshake timeout",
            ErrorType::NoPeerCertificate => "No peer certificate",
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::CertificateParseError => "Certificate could not be parsed",
            WarningType::NoCertificateNames => "Certificate without usable names",
        }
    }
}
