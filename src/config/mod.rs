// src/config/mod.rs

//! Project loading and watch-rule extraction.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and the typed `Trigger` (`model.rs`).
//! - Load a project file from disk (`loader.rs`).
//! - Validate individual watch rules (`validate.rs`).
//! - Resolve and canonicalize each service's rules into triggers (`develop.rs`).

pub mod develop;
pub mod loader;
pub mod model;
pub mod validate;

pub use develop::{load_development_config, load_watch_plan};
pub use loader::{default_project_path, load_from_path, load_project};
pub use model::{
    DevelopmentConfig, Project, RawDevelopBlock, RawProjectFile, RawWatchRule, ServiceConfig,
    ServiceWatch, Trigger,
};
