use crate::config::default_log_filter;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG` when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Directory for daily rolling log files (None = stderr only).
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Write the log files as JSON lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            directory: None,
            json: false,
        }
    }
}
