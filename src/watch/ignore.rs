// src/watch/ignore.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// Version-control metadata directories that never trigger anything.
pub const BUILTIN_IGNORED_DIRS: &[&str] = &[".git", ".hg", ".svn", ".bzr"];

/// Compiled ignore patterns for a single trigger.
///
/// Patterns are matched against paths relative to the trigger root, using
/// forward slashes. `*` does not cross a `/`. A pattern that names a
/// directory also excludes everything below it, so `node_modules` ignores
/// `node_modules/pkg/index.js` too.
#[derive(Clone)]
pub struct IgnoreMatcher {
    set: GlobSet,
    patterns: Vec<String>,
}

impl fmt::Debug for IgnoreMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreMatcher")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl IgnoreMatcher {
    /// Build a matcher from user patterns plus the built-in VCS exclusions.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for dir in BUILTIN_IGNORED_DIRS {
            add_with_descendants(&mut builder, &format!("**/{dir}"))?;
        }

        let mut kept = Vec::with_capacity(patterns.len());
        for raw in patterns {
            let pat = normalize_pattern(raw);
            if pat.is_empty() {
                continue;
            }
            add_with_descendants(&mut builder, pat)
                .with_context(|| format!("invalid ignore pattern: {raw}"))?;
            kept.push(pat.to_string());
        }

        Ok(Self {
            set: builder.build()?,
            patterns: kept,
        })
    }

    /// Returns true if `rel_path` (relative to the trigger root) is ignored.
    pub fn is_ignored(&self, rel_path: &str) -> bool {
        !rel_path.is_empty() && self.set.is_match(rel_path)
    }

    /// User patterns, after normalization.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

fn normalize_pattern(raw: &str) -> &str {
    let mut pat = raw.trim();
    while let Some(rest) = pat.strip_prefix("./") {
        pat = rest;
    }
    pat.trim_start_matches('/').trim_end_matches('/')
}

fn add_with_descendants(builder: &mut GlobSetBuilder, pat: &str) -> Result<()> {
    for p in [pat.to_string(), format!("{pat}/**")] {
        let glob = GlobBuilder::new(&p).literal_separator(true).build()?;
        builder.add(glob);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(patterns: &[&str]) -> IgnoreMatcher {
        let owned: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        IgnoreMatcher::new(&owned).unwrap()
    }

    #[test]
    fn plain_name_matches_file_and_directory_contents() {
        let m = matcher(&["ignore", "node_modules/"]);
        assert!(m.is_ignored("ignore"));
        assert!(m.is_ignored("ignore/nested.txt"));
        assert!(m.is_ignored("node_modules/pkg/index.js"));
        assert!(!m.is_ignored("changed"));
        assert!(!m.is_ignored("sub/ignore"));
    }

    #[test]
    fn star_does_not_cross_directories() {
        let m = matcher(&["*.tmp", "**/*.log"]);
        assert!(m.is_ignored("a.tmp"));
        assert!(!m.is_ignored("dir/a.tmp"));
        assert!(m.is_ignored("dir/deeper/app.log"));
    }

    #[test]
    fn vcs_directories_are_always_ignored() {
        let m = matcher(&[]);
        assert!(m.is_ignored(".git"));
        assert!(m.is_ignored(".git/index.lock"));
        assert!(m.is_ignored("vendor/lib/.hg/store"));
        assert!(!m.is_ignored(".gitignore"));
    }

    #[test]
    fn leading_dot_slash_is_stripped() {
        let m = matcher(&["./build", ""]);
        assert_eq!(m.patterns(), &["build".to_string()]);
        assert!(m.is_ignored("build/out.o"));
    }

    #[test]
    fn root_itself_is_never_ignored() {
        let m = matcher(&["**"]);
        assert!(!m.is_ignored(""));
    }

    #[test]
    fn invalid_glob_is_rejected() {
        assert!(IgnoreMatcher::new(&["src/[".to_string()]).is_err());
    }
}
