// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, bail, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Symlink chains longer than this are treated as loops.
const MAX_SYMLINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
    Symlink(PathBuf),
}

/// In-memory filesystem with absolute paths and symlinks.
///
/// Parent directories are created implicitly when a file or link is added.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(PathBuf::from("/"), MockEntry::Dir);

        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert(path.as_ref(), MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Dir);
    }

    /// Create a symlink at `link` pointing to `target`. Relative targets are
    /// resolved against the link's parent directory, like on a real system.
    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        self.insert(link.as_ref(), MockEntry::Symlink(target.as_ref().to_path_buf()));
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut entries = self.entries.lock().unwrap();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
        entries.insert(path.to_path_buf(), entry);
    }

    fn entry(&self, path: &Path) -> Option<MockEntry> {
        let entries = self.entries.lock().unwrap();
        entries.get(path).cloned()
    }

    fn resolve(&self, path: &Path, hops: &mut usize) -> Result<PathBuf> {
        if !path.is_absolute() {
            bail!("mock filesystem only supports absolute paths: {:?}", path);
        }

        let mut resolved = PathBuf::from("/");
        for component in path.components() {
            match component {
                Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(name) => {
                    let candidate = resolved.join(name);
                    match self.entry(&candidate) {
                        Some(MockEntry::Symlink(target)) => {
                            *hops += 1;
                            if *hops > MAX_SYMLINK_HOPS {
                                bail!("too many levels of symbolic links: {:?}", path);
                            }
                            let target = if target.is_absolute() {
                                target
                            } else {
                                resolved.join(target)
                            };
                            resolved = self.resolve(&target, hops)?;
                        }
                        Some(_) => resolved = candidate,
                        None => return Err(anyhow!("No such file or directory: {:?}", path)),
                    }
                }
            }
        }
        Ok(resolved)
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let real = self.canonicalize(path)?;
        match self.entry(&real) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(_) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.canonicalize(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        match self.canonicalize(path) {
            Ok(real) => matches!(self.entry(&real), Some(MockEntry::Dir)),
            Err(_) => false,
        }
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let mut hops = 0;
        self.resolve(path, &mut hops)
    }
}
