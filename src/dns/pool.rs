//! Resolver pool and its random selection.

use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DEFAULT_PUBLIC_RESOLVERS;
use crate::error_handling::ConfigError;

/// Source of uniformly distributed indices.
///
/// Injected into the pool resolver so selection can be made reproducible.
pub trait IndexSource: Send + Sync + fmt::Debug {
    /// Returns an index in `0..len`. `len` is never zero.
    fn next_index(&self, len: usize) -> usize;
}

/// Draws from the thread-local generator. The default source.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl IndexSource for ThreadRngSource {
    fn next_index(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Deterministic source for tests and reproducible runs.
#[derive(Debug)]
pub struct SeededSource {
    rng: Mutex<StdRng>,
}

impl SeededSource {
    /// Creates a source seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl IndexSource for SeededSource {
    fn next_index(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_range(0..len)
    }
}

/// Immutable, non-empty list of DNS servers.
///
/// Cheap to clone; the addresses are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverPool {
    servers: Arc<[SocketAddr]>,
}

impl ResolverPool {
    /// Creates a pool over `servers`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyResolverPool` if `servers` is empty.
    pub fn new(servers: Vec<SocketAddr>) -> Result<Self, ConfigError> {
        if servers.is_empty() {
            return Err(ConfigError::EmptyResolverPool);
        }
        Ok(Self {
            servers: servers.into(),
        })
    }

    /// The built-in list of public resolvers.
    pub fn public() -> Result<Self, ConfigError> {
        Self::new(crate::config::parse_resolvers(DEFAULT_PUBLIC_RESOLVERS)?)
    }

    /// Picks one server with a fresh uniform draw. Nothing is remembered
    /// between calls.
    pub fn pick(&self, source: &dyn IndexSource) -> SocketAddr {
        self.servers[source.next_index(self.servers.len())]
    }

    /// The servers in configuration order.
    pub fn servers(&self) -> &[SocketAddr] {
        &self.servers
    }

    /// Number of servers.
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Always `false`: construction rejects an empty pool.
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

impl fmt::Display for ResolverPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let servers: Vec<String> = self.servers.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", servers.join(", "))
    }
}
