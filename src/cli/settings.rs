use crate::cache::{CacheConfig, EvictionPolicy};
use crate::errors::CacheError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Layered settings for the binary. Every field is optional so layers can be merged:
/// CLI flags > environment > config files > defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub capacity: Option<usize>,
    pub policy: Option<EvictionPolicy>,
    pub initial_capacity: Option<usize>,
    pub load_factor: Option<f32>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Fills every unset field from `lower`.
    pub fn fill_from(&mut self, lower: AppConfig) {
        if self.capacity.is_none() { self.capacity = lower.capacity; }
        if self.policy.is_none() { self.policy = lower.policy; }
        if self.initial_capacity.is_none() { self.initial_capacity = lower.initial_capacity; }
        if self.load_factor.is_none() { self.load_factor = lower.load_factor; }
        if self.log_dir.is_none() { self.log_dir = lower.log_dir; }
        if self.log_level.is_none() { self.log_level = lower.log_level; }
    }

    /// Reads `MEMOLITE_*` variables through `lookup`. Unparseable values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            capacity: lookup("MEMOLITE_CAPACITY").and_then(|s| s.trim().parse().ok()),
            policy: lookup("MEMOLITE_POLICY").and_then(|s| s.parse().ok()),
            initial_capacity: lookup("MEMOLITE_INITIAL_CAPACITY").and_then(|s| s.trim().parse().ok()),
            load_factor: lookup("MEMOLITE_LOAD_FACTOR").and_then(|s| s.trim().parse().ok()),
            log_dir: lookup("MEMOLITE_LOG_DIR").map(PathBuf::from),
            log_level: lookup("MEMOLITE_LOG_LEVEL"),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// # Errors
    /// `Io` if the file cannot be read, `ConfigParse` if it is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, CacheError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CacheError::Io(format!("failed to read {}: {e}", path.display())))?;
        Ok(toml::from_str(&text)?)
    }

    /// Resolves to a validated cache configuration, defaults filling the gaps.
    ///
    /// # Errors
    /// `InvalidConfiguration` if the merged values are rejected.
    pub fn resolve(&self) -> Result<CacheConfig, CacheError> {
        let defaults = CacheConfig::default();
        let cfg = CacheConfig {
            capacity: self.capacity.unwrap_or(defaults.capacity),
            policy: self.policy.unwrap_or(defaults.policy),
            initial_capacity: self.initial_capacity.unwrap_or(defaults.initial_capacity),
            load_factor: self.load_factor.unwrap_or(defaults.load_factor),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Candidate config files, highest precedence first: explicit path, `MEMOLITE_CONFIG`,
/// `./memolite.toml`, `~/.config/memolite.toml`.
#[must_use]
pub fn find_config_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = vec![];
    if let Some(p) = explicit { paths.push(p.to_path_buf()); }
    if let Ok(p) = std::env::var("MEMOLITE_CONFIG") { paths.push(PathBuf::from(p)); }
    if let Ok(cur) = std::env::current_dir() { paths.push(cur.join("memolite.toml")); }
    if let Ok(home) = std::env::var("USERPROFILE").or_else(|_| std::env::var("HOME")) {
        paths.push(PathBuf::from(home).join(".config").join("memolite.toml"));
    }
    paths
}

/// Merges `cli` over the environment over every existing config file.
///
/// # Errors
/// An explicitly named file that is missing or malformed is an error; discovered files
/// that fail to parse are skipped with a warning.
pub fn load_layered(cli: AppConfig, explicit: Option<&Path>) -> Result<AppConfig, CacheError> {
    load_layered_with(cli, explicit, &find_config_paths(None), |k| std::env::var(k).ok())
}

/// `load_layered` with the discovered file list and the environment supplied by the caller.
/// Files earlier in `discovered` take precedence.
///
/// # Errors
/// As [`load_layered`].
pub fn load_layered_with(
    cli: AppConfig,
    explicit: Option<&Path>,
    discovered: &[PathBuf],
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, CacheError> {
    let mut cfg = cli;
    cfg.fill_from(AppConfig::from_lookup(lookup));
    if let Some(p) = explicit {
        cfg.fill_from(AppConfig::from_file(p)?);
    }
    for p in discovered {
        if !p.exists() {
            continue;
        }
        match AppConfig::from_file(p) {
            Ok(file_cfg) => cfg.fill_from(file_cfg),
            Err(e) => log::warn!("ignoring config {}: {e}", p.display()),
        }
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn upper_layers_win() {
        let mut cli = AppConfig { capacity: Some(3), ..Default::default() };
        cli.fill_from(AppConfig {
            capacity: Some(99),
            policy: Some(EvictionPolicy::InsertionOrder),
            ..Default::default()
        });
        assert_eq!(cli.capacity, Some(3));
        assert_eq!(cli.policy, Some(EvictionPolicy::InsertionOrder));
    }

    #[test]
    fn env_lookup_parses_and_skips_garbage() {
        let vars: HashMap<&str, &str> = [
            ("MEMOLITE_CAPACITY", " 12 "),
            ("MEMOLITE_POLICY", "fifo"),
            ("MEMOLITE_LOAD_FACTOR", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let cfg = AppConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string()));
        assert_eq!(cfg.capacity, Some(12));
        assert_eq!(cfg.policy, Some(EvictionPolicy::InsertionOrder));
        assert_eq!(cfg.load_factor, None);
    }

    #[test]
    fn resolve_applies_defaults_and_validates() {
        let cfg = AppConfig::default().resolve().unwrap();
        assert_eq!(cfg, CacheConfig::default());
        let bad = AppConfig { capacity: Some(0), ..Default::default() };
        assert!(bad.resolve().unwrap_err().is_invalid_configuration());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            load_layered_with(AppConfig::default(), Some(&missing), &[], |_| None),
            Err(CacheError::Io(_))
        ));
    }

    #[test]
    fn explicit_file_fills_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memolite.toml");
        std::fs::write(&path, "capacity = 5\npolicy = \"insertion\"\nlog_level = \"debug\"\n").unwrap();
        let cli = AppConfig { policy: Some(EvictionPolicy::AccessOrder), ..Default::default() };
        let merged = load_layered_with(cli, Some(&path), &[], |_| None).unwrap();
        assert_eq!(merged.policy, Some(EvictionPolicy::AccessOrder));
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn layers_apply_in_precedence_order() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.toml");
        let first = dir.path().join("first.toml");
        let second = dir.path().join("second.toml");
        let broken = dir.path().join("broken.toml");
        std::fs::write(&explicit, "capacity = 5\n").unwrap();
        std::fs::write(&first, "capacity = 6\nload_factor = 0.5\ninitial_capacity = 32\n").unwrap();
        std::fs::write(&second, "load_factor = 0.9\nlog_dir = \"logs\"\n").unwrap();
        std::fs::write(&broken, "capacity = [").unwrap();
        let discovered =
            vec![broken, dir.path().join("absent.toml"), first.clone(), second.clone()];

        let merged = load_layered_with(
            AppConfig { initial_capacity: Some(8), ..Default::default() },
            Some(&explicit),
            &discovered,
            |k| (k == "MEMOLITE_POLICY").then(|| "insertion".to_string()),
        )
        .unwrap();
        assert_eq!(merged.initial_capacity, Some(8));
        assert_eq!(merged.policy, Some(EvictionPolicy::InsertionOrder));
        assert_eq!(merged.capacity, Some(5));
        assert_eq!(merged.load_factor, Some(0.5));
        assert_eq!(merged.log_dir, Some(PathBuf::from("logs")));
        assert_eq!(merged.log_level, None);
    }
}
