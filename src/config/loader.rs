// src/config/loader.rs

use std::path::{Path, PathBuf};

use crate::config::model::{Project, RawProjectFile};
use crate::errors::{DevloopError, Result};
use crate::fs::FileSystem;

/// Read a project file and return the raw `RawProjectFile`.
///
/// This only performs TOML deserialization; watch rules are validated
/// per service by [`crate::config::load_development_config`].
pub fn load_from_path(path: impl AsRef<Path>, fs: &dyn FileSystem) -> Result<RawProjectFile> {
    let contents = fs.read_to_string(path.as_ref())?;
    let raw: RawProjectFile = toml::from_str(&contents)?;
    Ok(raw)
}

/// Load a project file and resolve its working directory.
///
/// `working_dir` defaults to the directory containing the project file;
/// a relative `working_dir` is taken relative to that same directory. It is
/// deliberately not canonicalized here: watch paths are canonicalized
/// individually when triggers are loaded.
pub fn load_project(path: impl AsRef<Path>, fs: &dyn FileSystem) -> Result<Project> {
    let path = path.as_ref();
    if !fs.exists(path) {
        return Err(DevloopError::ConfigError(format!(
            "project file not found: {}",
            path.display()
        )));
    }
    let raw = load_from_path(path, fs)?;
    let base = project_base_dir(path);

    let working_dir = match raw.working_dir {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => base.join(dir),
        None => base,
    };
    // A missing directory surfaces later, when watch paths are resolved.
    if fs.exists(&working_dir) && !fs.is_dir(&working_dir) {
        return Err(DevloopError::ConfigError(format!(
            "working_dir {} is not a directory",
            working_dir.display()
        )));
    }

    let services = raw
        .service
        .into_iter()
        .map(|(name, mut svc)| {
            svc.name = name;
            svc
        })
        .collect();

    Ok(Project {
        name: raw.name,
        working_dir,
        services,
    })
}

/// Default project file name, looked up in the current directory.
pub fn default_project_path() -> PathBuf {
    PathBuf::from("devloop.toml")
}

/// Directory containing the project file.
///
/// A bare file name like "devloop.toml" (parent = "") falls back to the
/// current working directory.
fn project_base_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
