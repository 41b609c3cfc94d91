// src/config/validate.rs

use crate::config::model::{Project, RawWatchRule};
use crate::errors::{DevloopError, Result};
use crate::types::TriggerAction;
use crate::watch::ignore::IgnoreMatcher;

/// The parts of a watch rule that can be checked without touching the
/// filesystem. Path resolution happens in [`crate::config::develop`].
#[derive(Debug, Clone)]
pub struct CheckedRule<'a> {
    pub path: &'a str,
    pub action: TriggerAction,
    pub target: Option<&'a str>,
}

pub fn validate_watch_rule<'a>(
    service: &str,
    index: usize,
    rule: &'a RawWatchRule,
) -> Result<CheckedRule<'a>> {
    let action_str = rule
        .action
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| missing(service, index, "action"))?;

    let action: TriggerAction = action_str
        .parse()
        .map_err(|reason| invalid(service, index, reason))?;

    let path = rule
        .path
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| missing(service, index, "path"))?;

    let target = rule.target.as_deref().filter(|s| !s.is_empty());

    if action == TriggerAction::Sync {
        match target {
            None => {
                return Err(invalid(
                    service,
                    index,
                    "`target` is required when action is \"sync\"".to_string(),
                ));
            }
            Some(t) if !t.starts_with('/') => {
                return Err(invalid(
                    service,
                    index,
                    format!("`target` must be an absolute path inside the container (got {t:?})"),
                ));
            }
            Some(_) => {}
        }
    }

    IgnoreMatcher::new(&rule.ignore)
        .map_err(|err| invalid(service, index, format!("`ignore`: {err:#}")))?;

    Ok(CheckedRule {
        path,
        action,
        target,
    })
}

/// Check that every service requested on the command line exists.
pub fn validate_selected_services(project: &Project, selected: &[String]) -> Result<()> {
    for name in selected {
        if project.service(name).is_none() {
            let known: Vec<&str> = project.services.iter().map(|s| s.name.as_str()).collect();
            return Err(DevloopError::ConfigError(format!(
                "no such service: '{}' (known services: {:?})",
                name, known
            )));
        }
    }
    Ok(())
}

fn missing(service: &str, index: usize, field: &'static str) -> DevloopError {
    DevloopError::MissingField {
        service: service.to_string(),
        index,
        field,
    }
}

fn invalid(service: &str, index: usize, reason: String) -> DevloopError {
    DevloopError::InvalidTrigger {
        service: service.to_string(),
        index,
        reason,
    }
}
