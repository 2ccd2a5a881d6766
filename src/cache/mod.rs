mod config;
mod core;
mod metrics;
mod policy;
mod shared;
mod sizing;

pub use config::{CacheConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR};
pub use self::core::{BoundedCache, Iter};
pub use metrics::{CacheMetrics, METRICS_TARGET};
pub use policy::EvictionPolicy;
pub use shared::SharedCache;
