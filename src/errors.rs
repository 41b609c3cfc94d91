// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Configuration problems (`MissingField`, `InvalidTrigger`, `ConfigError`)
//! are raised at load time, before any watcher is started. Watcher failures
//! carry the name of the service whose session produced them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevloopError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("service '{service}': watch[{index}] is missing required field `{field}`")]
    MissingField {
        service: String,
        index: usize,
        field: &'static str,
    },

    #[error("service '{service}': watch[{index}] is invalid: {reason}")]
    InvalidTrigger {
        service: String,
        index: usize,
        reason: String,
    },

    #[error("service '{service}': failed to start file watcher: {source}")]
    WatchStart {
        service: String,
        #[source]
        source: notify::Error,
    },

    #[error("service '{service}': file watcher error: {source}")]
    WatcherRuntime {
        service: String,
        #[source]
        source: notify::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DevloopError {
    /// Name of the service this error is attributed to, if any.
    pub fn service(&self) -> Option<&str> {
        match self {
            DevloopError::MissingField { service, .. }
            | DevloopError::InvalidTrigger { service, .. }
            | DevloopError::WatchStart { service, .. }
            | DevloopError::WatcherRuntime { service, .. } => Some(service),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DevloopError>;
