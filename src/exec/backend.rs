// src/exec/backend.rs

//! Pluggable action backends.
//!
//! The session never copies files or rebuilds images itself. It hands sync
//! mappings to a [`SyncBackend`] and debounced rebuild batches to a
//! [`RebuildBackend`]. Tests provide recording implementations; the binary
//! uses [`LogBackend`], which reports the planned action.

use std::future::Future;
use std::pin::Pin;

use tracing::info;

use crate::errors::Result;
use crate::types::{FileMapping, RebuildServices};

pub type BackendFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Receives one call per file that should be pushed into a running workload.
pub trait SyncBackend: Send {
    fn sync(&mut self, mapping: FileMapping) -> BackendFuture<'_>;
}

/// Receives one call per quiet period with every service needing a rebuild.
pub trait RebuildBackend: Send {
    fn rebuild(&mut self, services: RebuildServices) -> BackendFuture<'_>;
}

/// Backend that reports each action on stdout instead of performing it.
#[derive(Debug, Clone, Default)]
pub struct LogBackend {
    quiet: bool,
}

impl LogBackend {
    /// Log through `tracing` only, without the stdout line.
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl SyncBackend for LogBackend {
    fn sync(&mut self, mapping: FileMapping) -> BackendFuture<'_> {
        Box::pin(async move {
            let host = mapping
                .host_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let container = mapping.container_path.unwrap_or_default();

            info!(service = %mapping.service, %host, %container, "sync");
            if !self.quiet {
                println!("[devloop] sync {}: {} -> {}", mapping.service, host, container);
            }
            Ok(())
        })
    }
}

impl RebuildBackend for LogBackend {
    fn rebuild(&mut self, services: RebuildServices) -> BackendFuture<'_> {
        Box::pin(async move {
            let names: Vec<&str> = services.iter().map(String::as_str).collect();
            info!(services = ?names, "rebuild");
            if !self.quiet {
                println!("[devloop] rebuild: {}", names.join(", "));
            }
            Ok(())
        })
    }
}
