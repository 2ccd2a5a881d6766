use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid cache configuration: {0}")]
    InvalidConfiguration(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("trace parse error at line {line}: {reason}")]
    TraceParse { line: usize, reason: String },
}

impl CacheError {
    #[must_use]
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, CacheError::InvalidConfiguration(_))
    }
}
