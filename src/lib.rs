//! Bounded key-value caches for memoizing expensive per-key computations.
//!
//! Two eviction disciplines are available: insertion order (FIFO, overwrites keep their place)
//! and access order (LRU, reads and overwrites refresh). Either way the cache never holds more
//! than its capacity, and each insert evicts at most one entry.
//!
//! ```
//! use memolite::cache::{BoundedCache, EvictionPolicy};
//!
//! let mut cache = BoundedCache::new(EvictionPolicy::AccessOrder, 2)?;
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get("a");
//! cache.put("c", 3);
//! assert!(!cache.contains_key("b"));
//! # Ok::<(), memolite::errors::CacheError>(())
//! ```

pub mod cache;
pub mod cli;
pub mod errors;
pub mod logger;
pub mod utils;

pub use cache::{BoundedCache, CacheConfig, EvictionPolicy, SharedCache};
pub use errors::CacheError;

/// Initializes logging from `log4rs.yaml` when it exists in the working directory, otherwise
/// from `MEMOLITE_LOG_*` environment variables.
///
/// Optional: the library only emits through the `log` facade.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if std::path::Path::new("log4rs.yaml").exists() {
        logger::init()
    } else {
        logger::configure_from_env()
    }
}
