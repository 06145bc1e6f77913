//! DNS resolver initialization.

use std::sync::Arc;

use log::debug;

use crate::config::HarvestSettings;
use crate::dns::{PoolResolver, ResolverPool, ThreadRngSource};
use crate::error_handling::InitializationError;

/// Initializes the pool resolver used for every hostname lookup.
///
/// Each lookup picks one server from the configured pool uniformly at random
/// and gives it a single attempt bounded by the DNS timeout.
///
/// # Errors
///
/// Returns `InitializationError::DnsResolverError` if the resolver pool is empty.
pub fn init_resolver(settings: &HarvestSettings) -> Result<Arc<PoolResolver>, InitializationError> {
    let pool = ResolverPool::new(settings.resolvers.clone())?;
    debug!("Resolver pool: {pool}");

    Ok(Arc::new(
        PoolResolver::with_source(pool, Arc::new(ThreadRngSource))
            .with_query_timeout(settings.fetch.dns_timeout),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error_handling::ConfigError;

    #[test]
    fn test_init_resolver_uses_configured_pool() {
        let settings = Config::default().validate().unwrap();
        let resolver = init_resolver(&settings).unwrap();
        assert_eq!(resolver.pool().len(), settings.resolvers.len());
    }

    #[test]
    fn test_init_resolver_rejects_empty_pool() {
        let mut settings = Config::default().validate().unwrap();
        settings.resolvers.clear();
        assert!(matches!(
            init_resolver(&settings),
            Err(InitializationError::DnsResolverError(
                ConfigError::EmptyResolverPool
            ))
        ));
    }
}
