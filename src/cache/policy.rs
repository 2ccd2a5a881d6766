use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CacheError;

/// Eviction disciplines. The policy decides when an entry's sequence number is refreshed;
/// the entry with the smallest sequence is always the one evicted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvictionPolicy {
    /// Sequence assigned once, at first insertion. Overwrites and reads keep the position.
    #[serde(rename = "insertion", alias = "fifo", alias = "insertion_order")]
    InsertionOrder,
    /// Sequence refreshed on insertion, on overwrite and on every read hit (LRU).
    #[default]
    #[serde(rename = "access", alias = "lru", alias = "access_order")]
    AccessOrder,
}

impl EvictionPolicy {
    #[inline]
    #[must_use]
    pub fn refreshes_on_read(self) -> bool {
        matches!(self, EvictionPolicy::AccessOrder)
    }

    #[inline]
    #[must_use]
    pub fn refreshes_on_overwrite(self) -> bool {
        matches!(self, EvictionPolicy::AccessOrder)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EvictionPolicy::InsertionOrder => "insertion",
            EvictionPolicy::AccessOrder => "access",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insertion" | "insertion_order" | "insertion-order" | "fifo" => {
                Ok(EvictionPolicy::InsertionOrder)
            }
            "access" | "access_order" | "access-order" | "lru" => Ok(EvictionPolicy::AccessOrder),
            other => Err(CacheError::InvalidConfiguration(format!(
                "unknown eviction policy '{other}' (expected insertion|access)"
            ))),
        }
    }
}

/// Eviction hook consulted after every insert: the eldest entry goes once the map outgrows
/// its bound. A single insert grows the map by at most one, so one eviction always suffices.
#[inline]
#[must_use]
pub fn should_evict_eldest(len: usize, capacity: usize) -> bool {
    len > capacity
}
