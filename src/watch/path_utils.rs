// src/watch/path_utils.rs

//! Path helpers for matching host events and translating them into the
//! workload's filesystem.

use std::path::{Component, Path};

/// Path of `path` relative to `root`, with forward slashes.
///
/// Matching is component-wise, so `/srcfoo` is not under `/src`. Returns
/// `Some("")` when `path == root` and `None` when `path` is outside `root`.
/// Both paths are expected to be canonical already; no filesystem access
/// happens here.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Join a relative host path onto an absolute workload path.
///
/// Workload paths are always POSIX, whatever the host OS.
pub fn container_join(target: &str, rel: &str) -> String {
    let rel = rel.trim_start_matches('/');
    if rel.is_empty() {
        return target.to_string();
    }
    let base = target.trim_end_matches('/');
    format!("{base}/{rel}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_is_component_wise() {
        assert_eq!(
            relative_str(Path::new("/src"), Path::new("/src/a/b.txt")).as_deref(),
            Some("a/b.txt")
        );
        assert_eq!(relative_str(Path::new("/src"), Path::new("/src")).as_deref(), Some(""));
        assert_eq!(relative_str(Path::new("/src"), Path::new("/srcfoo/x")), None);
        assert_eq!(
            relative_str(Path::new("/"), Path::new("/dependencies.yaml")).as_deref(),
            Some("dependencies.yaml")
        );
    }

    #[test]
    fn join_handles_slashes() {
        assert_eq!(container_join("/work", "changed"), "/work/changed");
        assert_eq!(container_join("/work/", "a/b"), "/work/a/b");
        assert_eq!(container_join("/work", ""), "/work");
        assert_eq!(container_join("/", "etc/app.conf"), "/etc/app.conf");
    }
}
