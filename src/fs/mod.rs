// src/fs/mod.rs

//! Filesystem access used while loading a project.
//!
//! Loading reads the project file, checks the working directory and resolves
//! each watch path through symlinks. Going through [`FileSystem`] lets the
//! config tests describe symlinked layouts with [`mock::MockFileSystem`]
//! instead of touching disk.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// True if `path` resolves to an existing entry, following symlinks.
    fn exists(&self, path: &Path) -> bool;

    /// True if `path` resolves to a directory, following symlinks.
    fn is_dir(&self, path: &Path) -> bool;

    /// Absolute location of `path` with every symlink resolved. Fails if any
    /// component is missing.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}

/// The host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        std::fs::canonicalize(path)
            .with_context(|| format!("failed to resolve {}", path.display()))
    }
}
