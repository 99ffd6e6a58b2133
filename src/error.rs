use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while building or loading a [`GridConfig`](crate::config::GridConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfiguration {
        field: &'static str,
        reason: &'static str,
    },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidConfiguration { field, reason }
    }
}
