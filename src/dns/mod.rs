//! DNS resolution through a pool of public resolvers.
//!
//! This module provides:
//! - `ResolverPool`: the immutable list of DNS servers and uniform selection
//! - `IndexSource`: injectable randomness for that selection
//! - `PoolResolver`: async lookups and TCP connects over `hickory-resolver`,
//!   bypassing the operating system's resolver configuration

mod pool;
mod resolver;

// Re-export public API
pub use pool::{IndexSource, ResolverPool, SeededSource, ThreadRngSource};
pub use resolver::PoolResolver;
