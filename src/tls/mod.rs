//! TLS certificate fetching.
//!
//! This module connects to `host:port`, runs a TLS handshake without
//! verifying the server, and extracts names from the leaf certificate:
//! - DNS resolution and TCP connect through the pool resolver, bounded by the
//!   connect timeout
//! - The handshake raced against a timer, bounded by the handshake deadline
//! - Common Name and DNS Subject Alternative Names from the leaf certificate
//!
//! Uses `tokio-rustls` for the handshake and `x509-parser` for certificate parsing.

mod extract;
mod verifier;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use rustls::crypto::{ring, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName};
use rustls::ClientConfig;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

use crate::config::FetchSettings;
use crate::dns::PoolResolver;
use crate::domain::NameSet;
use crate::error_handling::{FetchError, InitializationError, ProcessingStats, WarningType};
use crate::models::HarvestResult;

pub use extract::{names_from_der, CertificateNames};
use verifier::AcceptAnyCertificate;

/// Fetches certificates and harvests their names, one port at a time.
///
/// Shared by all workers behind an `Arc`; every field is read-only.
#[derive(Clone)]
pub struct CertificateFetcher {
    resolver: Arc<PoolResolver>,
    connector: TlsConnector,
    settings: FetchSettings,
    stats: Arc<ProcessingStats>,
}

impl CertificateFetcher {
    /// Builds the fetcher and its non-verifying TLS client configuration.
    ///
    /// Uses the process-wide crypto provider if one is installed, `ring`
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::TlsConfigError` if the provider supports
    /// no safe protocol version.
    pub fn new(
        resolver: Arc<PoolResolver>,
        settings: FetchSettings,
        stats: Arc<ProcessingStats>,
    ) -> Result<Self, InitializationError> {
        let provider = CryptoProvider::get_default()
            .cloned()
            .unwrap_or_else(|| Arc::new(ring::default_provider()));

        let mut config = ClientConfig::builder_with_provider(Arc::clone(&provider))
            .with_safe_default_protocol_versions()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate::new(provider)))
            .with_no_client_auth();
        config.enable_sni = settings.enable_sni;

        Ok(Self {
            resolver,
            connector: TlsConnector::from(Arc::new(config)),
            settings,
            stats,
        })
    }

    /// Error and warning counters shared with the run.
    pub fn stats(&self) -> &Arc<ProcessingStats> {
        &self.stats
    }

    /// Harvests names from every port of `host`.
    ///
    /// Ports are tried in order and independently. A failed port is logged,
    /// counted and skipped. Names from all ports are merged into one
    /// case-insensitively unique list, each kept as first spelled.
    pub async fn fetch_names(&self, host: &str, ports: &[u16]) -> HarvestResult {
        let mut names = NameSet::new();
        let mut failed_ports = 0;

        for &port in ports {
            let leaf = match self.fetch_leaf_certificate(host, port).await {
                Ok(leaf) => leaf,
                Err(e) => {
                    warn!("{e}");
                    self.stats.increment_error(e.error_type());
                    failed_ports += 1;
                    continue;
                }
            };

            match CertificateNames::from_der(leaf.as_ref()) {
                Ok(cert_names) => {
                    let found = cert_names.to_name_set();
                    if found.is_empty() {
                        debug!("Certificate of {host}:{port} carries no usable names");
                        self.stats
                            .increment_warning(WarningType::NoCertificateNames);
                    }
                    names.append(found);
                }
                Err(e) => {
                    debug!("Failed to parse certificate of {host}:{port}: {e}");
                    self.stats
                        .increment_warning(WarningType::CertificateParseError);
                }
            }
        }

        HarvestResult {
            host: host.to_string(),
            names: names.into_vec(),
            failed_ports,
        }
    }

    /// Connects to `host:port` and returns the leaf certificate it presents.
    ///
    /// The connection is closed before this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` describing the failed step.
    pub async fn fetch_leaf_certificate(
        &self,
        host: &str,
        port: u16,
    ) -> Result<CertificateDer<'static>, FetchError> {
        let addr = format!("{host}:{port}");
        let server_name = server_name_for(host)?;

        debug!("Connecting to {addr}");
        let stream = match tokio::time::timeout(
            self.settings.connect_timeout,
            self.resolver.connect(host, port),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(FetchError::ConnectTimeout {
                    addr,
                    timeout: self.settings.connect_timeout,
                })
            }
        };

        let chain = handshake_with_deadline(
            self.connector.clone(),
            server_name,
            stream,
            self.settings.handshake_deadline,
            &addr,
        )
        .await?;

        chain
            .into_iter()
            .next()
            .ok_or(FetchError::NoCertificate(addr))
    }
}

/// Converts a hostname or IP literal into a TLS server name.
fn server_name_for(host: &str) -> Result<ServerName<'static>, FetchError> {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    ServerName::try_from(bare.to_string())
        .map_err(|_| FetchError::InvalidServerName(host.to_string()))
}

enum HandshakeOutcome {
    Completed(TlsStream<TcpStream>),
    Failed(std::io::Error),
    TimedOut,
}

/// Runs the handshake on its own task and races it against a timer.
///
/// Both tasks report into one channel of capacity 2, so neither can block
/// on send even after the other has won. The handshake future also carries
/// the deadline itself, so its socket is released if it is never aborted.
async fn handshake_with_deadline(
    connector: TlsConnector,
    server_name: ServerName<'static>,
    stream: TcpStream,
    deadline: Duration,
    addr: &str,
) -> Result<Vec<CertificateDer<'static>>, FetchError> {
    let (tx, mut rx) = mpsc::channel(2);
    let expires_at = Instant::now() + deadline;

    let handshake_tx = tx.clone();
    let handshake = tokio::spawn(async move {
        let outcome =
            match tokio::time::timeout_at(expires_at, connector.connect(server_name, stream)).await
            {
                Ok(Ok(tls)) => HandshakeOutcome::Completed(tls),
                Ok(Err(e)) => HandshakeOutcome::Failed(e),
                Err(_) => HandshakeOutcome::TimedOut,
            };
        let _ = handshake_tx.try_send(outcome);
    });

    let timer = tokio::spawn(async move {
        tokio::time::sleep_until(expires_at).await;
        let _ = tx.try_send(HandshakeOutcome::TimedOut);
    });

    let outcome = rx.recv().await;
    timer.abort();

    match outcome {
        Some(HandshakeOutcome::Completed(tls)) => {
            let chain = tls
                .get_ref()
                .1
                .peer_certificates()
                .map(<[CertificateDer<'static>]>::to_vec)
                .unwrap_or_default();
            drop(tls);
            debug!("Handshake with {addr} completed ({} certificates)", chain.len());
            Ok(chain)
        }
        Some(HandshakeOutcome::Failed(source)) => Err(FetchError::Handshake {
            addr: addr.to_string(),
            source,
        }),
        Some(HandshakeOutcome::TimedOut) | None => {
            handshake.abort();
            Err(FetchError::HandshakeTimeout {
                addr: addr.to_string(),
                deadline,
            })
        }
    }
}
