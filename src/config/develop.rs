// src/config/develop.rs

//! Turning a service's `develop` extension block into typed triggers.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{
    DevelopmentConfig, Project, RawDevelopBlock, ServiceConfig, ServiceWatch, Trigger,
};
use crate::config::validate::{validate_selected_services, validate_watch_rule};
use crate::errors::{DevloopError, Result};
use crate::fs::FileSystem;

/// Load the watch rules of one service.
///
/// - No `develop` block: empty config, watching is disabled for the service.
/// - Relative paths are resolved against the project working directory.
/// - Every path is canonicalized, so a rule on a symlinked directory matches
///   the real paths reported by the OS watcher.
pub fn load_development_config(
    service: &ServiceConfig,
    project: &Project,
    fs: &dyn FileSystem,
) -> Result<DevelopmentConfig> {
    let Some(block) = service.develop_block() else {
        debug!(service = %service.name, "no develop block; watch disabled");
        return Ok(DevelopmentConfig::default());
    };

    let raw: RawDevelopBlock = block.clone().try_into().map_err(|err: toml::de::Error| {
        DevloopError::ConfigError(format!(
            "service '{}': invalid develop block: {}",
            service.name, err
        ))
    })?;

    let mut watch = Vec::with_capacity(raw.watch.len());
    for (index, rule) in raw.watch.iter().enumerate() {
        let checked = validate_watch_rule(&service.name, index, rule)?;

        let path = resolve_watch_path(&project.working_dir, checked.path, fs).map_err(|err| {
            DevloopError::InvalidTrigger {
                service: service.name.clone(),
                index,
                reason: format!("`path` {:?} cannot be resolved: {err:#}", checked.path),
            }
        })?;

        debug!(
            service = %service.name,
            index,
            path = ?path,
            action = %checked.action,
            "loaded watch rule"
        );

        watch.push(Trigger {
            path,
            action: checked.action,
            target: checked.target.map(String::from),
            ignore: rule.ignore.clone(),
        });
    }

    Ok(DevelopmentConfig { watch })
}

/// Load triggers for the selected services (all services if `selected` is
/// empty), skipping those without watch rules.
///
/// Fails if none of the selected services has anything to watch.
pub fn load_watch_plan(
    project: &Project,
    selected: &[String],
    fs: &dyn FileSystem,
) -> Result<Vec<ServiceWatch>> {
    validate_selected_services(project, selected)?;

    let mut plan = Vec::new();
    for service in &project.services {
        if !selected.is_empty() && !selected.contains(&service.name) {
            continue;
        }

        let cfg = load_development_config(service, project, fs)?;
        if cfg.is_empty() {
            info!(service = %service.name, "service has no watch rules; skipping");
            continue;
        }

        plan.push(ServiceWatch {
            service: service.name.clone(),
            triggers: cfg.watch,
        });
    }

    if plan.is_empty() {
        return Err(DevloopError::ConfigError(
            "none of the selected services is configured for watch, consider adding a `develop` block"
                .to_string(),
        ));
    }

    Ok(plan)
}

fn resolve_watch_path(working_dir: &Path, raw: &str, fs: &dyn FileSystem) -> anyhow::Result<PathBuf> {
    let raw = Path::new(raw);
    let joined = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        working_dir.join(raw)
    };
    fs.canonicalize(&joined)
}
