// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{ServiceName, TriggerAction};

/// Extension key holding a service's watch rules.
pub const DEVELOP_KEY: &str = "develop";

/// Older spelling of [`DEVELOP_KEY`], still accepted.
pub const LEGACY_DEVELOP_KEY: &str = "x-develop";

/// Top-level project file as read from TOML.
///
/// ```toml
/// name = "demo"
/// working_dir = "."
///
/// [service.app.develop]
/// watch = [
///   { path = "./src", action = "sync", target = "/app/src", ignore = ["*.tmp"] },
///   { path = "./Cargo.toml", action = "rebuild" },
/// ]
/// ```
///
/// All sections are optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawProjectFile {
    #[serde(default)]
    pub name: Option<String>,

    /// Directory that relative watch paths are resolved against. Relative
    /// values are taken relative to the project file's directory.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// All services from `[service.<name>]`.
    #[serde(default)]
    pub service: BTreeMap<ServiceName, ServiceConfig>,
}

/// A single `[service.<name>]` table.
///
/// Everything in the table is kept as opaque extension data; the watch loop
/// only ever looks at the `develop` (or `x-develop`) entry.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServiceConfig {
    /// Filled in from the table key by the loader.
    #[serde(skip)]
    pub name: ServiceName,

    #[serde(flatten)]
    pub extensions: BTreeMap<String, toml::Value>,
}

impl ServiceConfig {
    /// The raw develop block, preferring `develop` over `x-develop`.
    pub fn develop_block(&self) -> Option<&toml::Value> {
        self.extensions
            .get(DEVELOP_KEY)
            .or_else(|| self.extensions.get(LEGACY_DEVELOP_KEY))
    }
}

/// A loaded project with its working directory resolved.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: Option<String>,
    pub working_dir: PathBuf,
    pub services: Vec<ServiceConfig>,
}

impl Project {
    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.iter().find(|s| s.name == name)
    }
}

/// The `develop` extension block, before validation.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDevelopBlock {
    #[serde(default)]
    pub watch: Vec<RawWatchRule>,
}

/// One entry of `develop.watch`, before validation.
///
/// Every field is optional here so that a missing one can be reported by
/// name instead of as a generic deserialization failure.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawWatchRule {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// A validated watch rule for one path.
///
/// `path` is always absolute and symlink-free so it can be compared by
/// prefix against the paths the OS watcher reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub path: PathBuf,
    pub action: TriggerAction,
    /// Location inside the workload; only used by `sync`.
    pub target: Option<String>,
    /// Glob patterns relative to `path`.
    pub ignore: Vec<String>,
}

/// Watch rules for one service, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DevelopmentConfig {
    pub watch: Vec<Trigger>,
}

impl DevelopmentConfig {
    pub fn is_empty(&self) -> bool {
        self.watch.is_empty()
    }
}

/// A service that has at least one trigger, ready to be watched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceWatch {
    pub service: ServiceName,
    pub triggers: Vec<Trigger>,
}
