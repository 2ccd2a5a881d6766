use crate::cache::CacheConfig;
use std::path::PathBuf;

pub enum Command {
    /// Replay a trace file against a fresh cache built from `config`.
    Replay { trace: PathBuf, config: CacheConfig },
    /// Print the effective configuration after layering.
    CheckConfig { config: CacheConfig },
}
