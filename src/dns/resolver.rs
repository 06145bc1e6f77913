//! Pool resolver: every query goes to a randomly picked public DNS server.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use log::{debug, trace};
use tokio::net::TcpStream;

use super::pool::{IndexSource, ResolverPool, ThreadRngSource};
use crate::config::DNS_TIMEOUT;
use crate::error_handling::FetchError;

/// DNS transport that bypasses the system resolver.
///
/// Each query picks a server from the pool and goes to it directly (UDP,
/// TCP on truncation). There is no cache between lookups and no retry on
/// another server.
#[derive(Debug, Clone)]
pub struct PoolResolver {
    pool: ResolverPool,
    source: Arc<dyn IndexSource>,
    query_timeout: Duration,
}

impl PoolResolver {
    /// Creates a resolver over `pool` drawing from the thread-local RNG.
    pub fn new(pool: ResolverPool) -> Self {
        Self::with_source(pool, Arc::new(ThreadRngSource))
    }

    /// Creates a resolver with an explicit index source.
    pub fn with_source(pool: ResolverPool, source: Arc<dyn IndexSource>) -> Self {
        Self {
            pool,
            source,
            query_timeout: DNS_TIMEOUT,
        }
    }

    /// Sets the per-query timeout.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// The servers this resolver picks from.
    pub fn pool(&self) -> &ResolverPool {
        &self.pool
    }

    /// Picks the server the next query will go to.
    pub fn next_server(&self) -> SocketAddr {
        self.pool.pick(self.source.as_ref())
    }

    /// Builds a single-server resolver for one query.
    fn resolver_for(&self, server: SocketAddr) -> TokioAsyncResolver {
        let group = NameServerConfigGroup::from_ips_clear(&[server.ip()], server.port(), true);
        let config = ResolverConfig::from_parts(None, vec![], group);

        let mut opts = ResolverOpts::default();
        opts.timeout = self.query_timeout;
        opts.attempts = 1;
        opts.ndots = 0;
        opts.use_hosts_file = false;

        TokioAsyncResolver::tokio(config, opts)
    }

    /// Resolves `host` to its addresses. IP literals are returned as is.
    ///
    /// The A and AAAA queries run concurrently and each draws its own server
    /// from the pool. IPv4 addresses come first.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Resolve` if neither query yields an address. The
    /// error names the server of the A query unless only the AAAA query
    /// failed.
    pub async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, FetchError> {
        if let Ok(ip) = host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let v4_server = self.next_server();
        let v6_server = self.next_server();
        trace!("Resolving {host} via {v4_server} (A) and {v6_server} (AAAA)");

        let v4_resolver = self.resolver_for(v4_server);
        let v6_resolver = self.resolver_for(v6_server);
        let (v4, v6) = tokio::join!(v4_resolver.ipv4_lookup(host), v6_resolver.ipv6_lookup(host));

        let mut addrs = Vec::new();
        let mut failure = None;
        match v4 {
            Ok(lookup) => addrs.extend(lookup.iter().map(|a| IpAddr::V4(a.0))),
            Err(e) => failure = Some((v4_server, e.to_string())),
        }
        match v6 {
            Ok(lookup) => addrs.extend(lookup.iter().map(|aaaa| IpAddr::V6(aaaa.0))),
            Err(e) => {
                failure.get_or_insert((v6_server, e.to_string()));
            }
        }

        if addrs.is_empty() {
            let (server, reason) =
                failure.unwrap_or((v4_server, "no addresses returned".to_string()));
            return Err(FetchError::Resolve {
                host: host.to_string(),
                server: server.to_string(),
                reason,
            });
        }
        debug!("Resolved {host}: {addrs:?}");
        Ok(addrs)
    }

    /// Resolves `host` and connects to the first address that accepts.
    ///
    /// The caller bounds the whole operation with the connect timeout.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Resolve` if resolution fails, or
    /// `FetchError::Connect` with the last connect error.
    pub async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, FetchError> {
        let addrs = self.resolve(host).await?;

        let mut last_error = None;
        for ip in addrs {
            let addr = SocketAddr::new(ip, port);
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    trace!("Connect to {addr} for {host} failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        Err(FetchError::Connect {
            addr: format!("{host}:{port}"),
            source: last_error
                .unwrap_or_else(|| std::io::Error::from(std::io::ErrorKind::AddrNotAvailable)),
        })
    }
}
