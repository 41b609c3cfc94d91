#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use devloop::config::model::{DEVELOP_KEY, LEGACY_DEVELOP_KEY};
use devloop::config::{Project, ServiceConfig, ServiceWatch, Trigger};
use devloop::types::TriggerAction;
use toml::{Table, Value};

/// Builder for `Project` to simplify test setup.
pub struct ProjectBuilder {
    project: Project,
}

impl ProjectBuilder {
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            project: Project {
                name: None,
                working_dir: working_dir.as_ref().to_path_buf(),
                services: Vec::new(),
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.project.name = Some(name.to_string());
        self
    }

    pub fn with_service(mut self, service: ServiceConfig) -> Self {
        self.project.services.push(service);
        self
    }

    pub fn build(self) -> Project {
        self.project
    }
}

/// Builder for a `ServiceConfig` carrying a develop block.
///
/// Rules are raw, exactly as they would appear in the project file, so
/// invalid ones can be built too.
pub struct ServiceBuilder {
    name: String,
    key: &'static str,
    rules: Vec<Table>,
    develop: bool,
    extra: BTreeMap<String, Value>,
}

impl ServiceBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            key: DEVELOP_KEY,
            rules: Vec::new(),
            develop: false,
            extra: BTreeMap::new(),
        }
    }

    /// Store the block under `x-develop` instead of `develop`.
    pub fn legacy_key(mut self) -> Self {
        self.key = LEGACY_DEVELOP_KEY;
        self
    }

    pub fn extension(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Add a rule with arbitrary fields; `None` leaves a field out.
    pub fn rule(mut self, path: Option<&str>, action: Option<&str>, target: Option<&str>) -> Self {
        self.develop = true;
        let mut rule = Table::new();
        if let Some(p) = path {
            rule.insert("path".to_string(), Value::String(p.to_string()));
        }
        if let Some(a) = action {
            rule.insert("action".to_string(), Value::String(a.to_string()));
        }
        if let Some(t) = target {
            rule.insert("target".to_string(), Value::String(t.to_string()));
        }
        self.rules.push(rule);
        self
    }

    pub fn sync(self, path: &str, target: &str) -> Self {
        self.rule(Some(path), Some("sync"), Some(target))
    }

    pub fn rebuild(self, path: &str) -> Self {
        self.rule(Some(path), Some("rebuild"), None)
    }

    /// Add an ignore pattern to the most recently added rule.
    pub fn ignore(mut self, pattern: &str) -> Self {
        let rule = self.rules.last_mut().expect("ignore() needs a rule first");
        let list = rule
            .entry("ignore".to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = list {
            items.push(Value::String(pattern.to_string()));
        }
        self
    }

    pub fn build(self) -> ServiceConfig {
        let mut extensions = self.extra;
        if self.develop {
            let mut block = Table::new();
            block.insert(
                "watch".to_string(),
                Value::Array(self.rules.into_iter().map(Value::Table).collect()),
            );
            extensions.insert(self.key.to_string(), Value::Table(block));
        }
        ServiceConfig {
            name: self.name,
            extensions,
        }
    }
}

/// Builder for an already-resolved `ServiceWatch`, bypassing the loader.
pub struct ServiceWatchBuilder {
    watch: ServiceWatch,
}

impl ServiceWatchBuilder {
    pub fn new(service: &str) -> Self {
        Self {
            watch: ServiceWatch {
                service: service.to_string(),
                triggers: Vec::new(),
            },
        }
    }

    pub fn sync(mut self, path: &str, target: &str, ignore: &[&str]) -> Self {
        self.watch.triggers.push(Trigger {
            path: PathBuf::from(path),
            action: TriggerAction::Sync,
            target: Some(target.to_string()),
            ignore: ignore.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn rebuild(mut self, path: &str) -> Self {
        self.watch.triggers.push(Trigger {
            path: PathBuf::from(path),
            action: TriggerAction::Rebuild,
            target: None,
            ignore: Vec::new(),
        });
        self
    }

    pub fn build(self) -> ServiceWatch {
        self.watch
    }
}
