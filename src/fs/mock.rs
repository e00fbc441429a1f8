// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { modified: SystemTime },
    Dir {
        modified: SystemTime,
        children: Vec<String>,
    },
}

impl MockEntry {
    fn modified(&self) -> SystemTime {
        match self {
            MockEntry::File { modified } | MockEntry::Dir { modified, .. } => *modified,
        }
    }
}

/// In-memory tree with explicit modification times.
///
/// Creating an entry bumps its parent directory's mtime, like a real
/// filesystem does. [`MockFileSystem::set_modified`] changes a single entry
/// only, which models an in-place write.
///
/// Paths are keyed exactly as given; root everything at `./` so that
/// `read_dir(".")` hands back the same keys.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    /// New tree containing only the root `.` with the given mtime.
    pub fn new(root_modified: SystemTime) -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            PathBuf::from("."),
            MockEntry::Dir {
                modified: root_modified,
                children: Vec::new(),
            },
        );

        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub fn add_dir(&self, path: impl AsRef<Path>, at: SystemTime) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries.lock().unwrap();
        Self::insert_entry(
            &mut entries,
            path,
            MockEntry::Dir {
                modified: at,
                children: Vec::new(),
            },
            at,
        );
    }

    pub fn add_file(&self, path: impl AsRef<Path>, at: SystemTime) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries.lock().unwrap();
        Self::insert_entry(&mut entries, path, MockEntry::File { modified: at }, at);
    }

    /// Overwrite the mtime of one existing entry, leaving its parent alone.
    pub fn set_modified(&self, path: impl AsRef<Path>, at: SystemTime) {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(path.as_ref()) {
            Some(MockEntry::File { modified }) | Some(MockEntry::Dir { modified, .. }) => {
                *modified = at;
            }
            None => {}
        }
    }

    fn insert_entry(
        entries: &mut HashMap<PathBuf, MockEntry>,
        path: PathBuf,
        entry: MockEntry,
        at: SystemTime,
    ) {
        let parent = parent_of(&path);
        if parent != path {
            if !entries.contains_key(&parent) {
                Self::insert_entry(
                    entries,
                    parent.clone(),
                    MockEntry::Dir {
                        modified: at,
                        children: Vec::new(),
                    },
                    at,
                );
            }
            if let Some(MockEntry::Dir { modified, children }) = entries.get_mut(&parent) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if !children.contains(&name.to_string()) {
                        children.push(name.to_string());
                        *modified = at;
                    }
                }
            }
        }
        // Re-adding an existing directory only touches it.
        if let (Some(MockEntry::Dir { modified, .. }), MockEntry::Dir { modified: new_mtime, .. }) =
            (entries.get_mut(&path), &entry)
        {
            *modified = *new_mtime;
            return;
        }
        entries.insert(path, entry);
    }
}

fn parent_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

impl FileSystem for MockFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        let entries = self.entries.lock().unwrap();
        matches!(entries.get(path), Some(MockEntry::Dir { .. }))
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(path)
            .map(MockEntry::modified)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::Dir { children, .. }) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
