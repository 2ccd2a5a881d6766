use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cache::policy::EvictionPolicy;
use crate::errors::CacheError;

pub const DEFAULT_INITIAL_CAPACITY: usize = 16;
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Configuration for the cache. `capacity` has no file default and must be given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub capacity: usize,
    #[serde(default)]
    pub policy: EvictionPolicy,
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize, // sizing hint only, never changes eviction
    #[serde(default = "default_load_factor")]
    pub load_factor: f32,
}

fn default_initial_capacity() -> usize {
    DEFAULT_INITIAL_CAPACITY
}

fn default_load_factor() -> f32 {
    DEFAULT_LOAD_FACTOR
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            policy: EvictionPolicy::AccessOrder,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn new(policy: EvictionPolicy, capacity: usize) -> Self {
        Self { capacity, policy, ..Default::default() }
    }

    /// Rejects a zero capacity and, for access-order caches, a load factor that is not a
    /// positive finite number.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidConfiguration` naming the offending field.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfiguration(
                "capacity must be a positive integer".into(),
            ));
        }
        if self.policy == EvictionPolicy::AccessOrder
            && !(self.load_factor.is_finite() && self.load_factor > 0.0)
        {
            return Err(CacheError::InvalidConfiguration(format!(
                "load_factor must be a positive number, got {}",
                self.load_factor
            )));
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    /// Returns `ConfigParse` for malformed TOML and `InvalidConfiguration` for rejected values.
    pub fn from_toml_str(s: &str) -> Result<Self, CacheError> {
        let cfg: CacheConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads a config file from disk.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read, otherwise as `from_toml_str`.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CacheError::Io(format!("failed to read {}: {e}", path.display())))?;
        let cfg = Self::from_toml_str(&text)?;
        log::info!(
            "loaded cache config from {}: policy={} capacity={}",
            path.display(),
            cfg.policy,
            cfg.capacity
        );
        Ok(cfg)
    }

    #[must_use]
    pub fn to_toml_string(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }
}
