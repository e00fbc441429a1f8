// src/watch/patterns.rs

use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled `[watch].exclude` patterns.
///
/// Patterns are matched against paths relative to the watched directory,
/// using `/` separators.
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    set: GlobSet,
    empty: bool,
}

impl ExcludeSet {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern)
                .with_context(|| format!("compiling exclude pattern '{}'", pattern))?;
            builder.add(glob);
        }
        let set = builder.build().context("building exclude glob set")?;
        Ok(Self {
            set,
            empty: patterns.is_empty(),
        })
    }

    /// Set that excludes nothing.
    pub fn none() -> Self {
        Self {
            set: GlobSet::empty(),
            empty: true,
        }
    }

    /// Whether `path` (anywhere under `root`) is excluded.
    ///
    /// The root itself is never excluded, and paths outside `root` are left
    /// alone.
    pub fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        if self.empty {
            return false;
        }
        let Ok(rel) = path.strip_prefix(root) else {
            return false;
        };
        if rel.as_os_str().is_empty() {
            return false;
        }
        let rel = rel.to_string_lossy().replace('\\', "/");
        self.set.is_match(rel.as_str())
    }

    /// Whether `path` or any of its ancestors below `root` is excluded.
    pub fn covers(&self, root: &Path, path: &Path) -> bool {
        if self.empty {
            return false;
        }
        path.ancestors()
            .take_while(|p| p.starts_with(root))
            .any(|p| self.is_excluded(root, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_relative_to_root() {
        let set = ExcludeSet::new(&["**/.git".to_string(), "generated".to_string()]).unwrap();
        let root = Path::new("./src");

        assert!(set.is_excluded(root, Path::new("./src/generated")));
        assert!(set.is_excluded(root, Path::new("./src/vendor/.git")));
        assert!(!set.is_excluded(root, Path::new("./src/lexer")));
        assert!(!set.is_excluded(root, Path::new("./src")));
    }

    #[test]
    fn covers_checks_ancestors() {
        let set = ExcludeSet::new(&["generated".to_string()]).unwrap();
        let root = Path::new("/p/src");

        assert!(set.covers(root, Path::new("/p/src/generated/out/x.c")));
        assert!(!set.covers(root, Path::new("/p/src/vm/vm.c")));
        assert!(!ExcludeSet::none().covers(root, Path::new("/p/src/generated")));
    }
}
