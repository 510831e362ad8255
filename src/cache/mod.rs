//! Cache Module
//!
//! Redis-backed cache-aside layer with an in-process fallback map, TTL
//! expiration, key namespacing and pattern invalidation.

mod entry;
mod layer;
mod memory;
mod pattern;
mod stats;


// Re-export public types
pub use entry::CacheEntry;
pub use layer::{CacheLayer, CacheScope, CacheSettings};
pub use memory::MemoryStore;
pub use pattern::glob_match;
pub use stats::{CacheMetrics, CacheStats, CacheStatsSnapshot};
