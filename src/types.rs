use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

/// Canonical service name type used throughout the engine.
pub type ServiceName = String;

/// Set of services that need a rebuild, accumulated over one quiet period.
pub type RebuildServices = BTreeSet<ServiceName>;

/// What to do when a watched path changes.
///
/// - `Sync`: copy the changed file into the running workload.
/// - `Rebuild`: rebuild and redeploy the whole service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerAction {
    Sync,
    Rebuild,
}

impl TriggerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerAction::Sync => "sync",
            TriggerAction::Rebuild => "rebuild",
        }
    }
}

impl fmt::Display for TriggerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sync" => Ok(TriggerAction::Sync),
            "rebuild" => Ok(TriggerAction::Rebuild),
            other => Err(format!(
                "invalid action: {other} (expected \"sync\" or \"rebuild\")"
            )),
        }
    }
}

/// A classified change, ready to be acted on for one service.
///
/// Sync mappings carry both the host path and its translated location inside
/// the workload; rebuild mappings only carry the service name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMapping {
    pub service: ServiceName,
    pub host_path: Option<PathBuf>,
    pub container_path: Option<String>,
}

impl FileMapping {
    pub fn sync(
        service: impl Into<ServiceName>,
        host_path: impl Into<PathBuf>,
        container_path: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            host_path: Some(host_path.into()),
            container_path: Some(container_path.into()),
        }
    }

    pub fn rebuild(service: impl Into<ServiceName>) -> Self {
        Self {
            service: service.into(),
            host_path: None,
            container_path: None,
        }
    }
}
