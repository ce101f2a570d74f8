//! Caching subsystem.
//!
//! - [`key`] derives order-independent keys from a namespace and named
//!   query parameters.
//! - [`store::FeedCache`] is the TTL store shared across requests. It holds
//!   normalized per-provider listings and merged tag statistics.

pub mod key;
pub mod store;

pub use key::cache_key;
pub use store::{CacheConfig, CacheEntry, CachedValue, FeedCache};
