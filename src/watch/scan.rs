// src/watch/scan.rs

//! Modification-time scan of the watched tree.
//!
//! Only directory mtimes are compared, never file mtimes: creating, deleting
//! or renaming a file (which is how most editors save) bumps the mtime of the
//! directory holding it. An in-place write that leaves the directory alone is
//! not seen by this scan; the `notify` detector covers that case.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::Result;
use tracing::trace;

use crate::fs::FileSystem;
use crate::watch::patterns::ExcludeSet;

/// Latest mtime across `root` and every directory below it.
///
/// Fails if `root` itself can't be read (e.g. it was deleted).
pub fn latest_modification(
    fs: &dyn FileSystem,
    root: &Path,
    exclude: &ExcludeSet,
) -> Result<SystemTime> {
    let mut latest = SystemTime::UNIX_EPOCH;
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let modified = fs.modified(&dir)?;
        if modified > latest {
            latest = modified;
        }

        for child in fs.read_dir(&dir)? {
            if fs.is_dir(&child) && !exclude.is_excluded(root, &child) {
                pending.push(child);
            }
        }
    }

    trace!(root = ?root, ?latest, "scanned watched tree");
    Ok(latest)
}

/// Whether the tree under `root` changed within `window` of `now`.
///
/// A latest mtime that lies in the future relative to `now` (clock skew,
/// network filesystems) also counts as a change.
pub fn has_changes(
    fs: &dyn FileSystem,
    root: &Path,
    exclude: &ExcludeSet,
    window: Duration,
    now: SystemTime,
) -> Result<bool> {
    let latest = latest_modification(fs, root, exclude)?;
    Ok(match now.duration_since(latest) {
        Ok(age) => age <= window,
        Err(_) => true,
    })
}

/// [`has_changes`] against the wall clock.
pub fn has_changes_now(
    fs: &dyn FileSystem,
    root: &Path,
    exclude: &ExcludeSet,
    window: Duration,
) -> Result<bool> {
    has_changes(fs, root, exclude, window, SystemTime::now())
}
