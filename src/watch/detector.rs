// src/watch/detector.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::DetectorKind;
use crate::watch::patterns::ExcludeSet;
use crate::watch::scan::has_changes_now;

/// Answers "did the watched tree change since we last looked?".
///
/// The runtime calls `poll` once per poll interval.
pub trait ChangeDetector: Send {
    fn poll(&mut self) -> Result<bool>;
}

impl<T: ChangeDetector + ?Sized> ChangeDetector for Box<T> {
    fn poll(&mut self) -> Result<bool> {
        (**self).poll()
    }
}

/// Detector backed by the directory-mtime scan.
#[derive(Debug)]
pub struct PollingDetector {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    exclude: ExcludeSet,
    window: Duration,
}

impl PollingDetector {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        exclude: ExcludeSet,
        window: Duration,
    ) -> Self {
        Self {
            fs,
            root: root.into(),
            exclude,
            window,
        }
    }
}

impl ChangeDetector for PollingDetector {
    fn poll(&mut self) -> Result<bool> {
        Ok(has_changes_now(
            self.fs.as_ref(),
            &self.root,
            &self.exclude,
            self.window,
        )?)
    }
}

/// Detector backed by the platform file watcher.
///
/// `notify` calls back on its own thread; events are parked in a channel and
/// drained on each poll. Any non-access event outside the excluded
/// directories counts as a change.
pub struct NotifyDetector {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    root: PathBuf,
    exclude: ExcludeSet,
}

impl fmt::Debug for NotifyDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyDetector")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl NotifyDetector {
    /// Start watching `root` recursively.
    pub fn new(root: impl AsRef<Path>, exclude: ExcludeSet) -> Result<Self> {
        let root = root.as_ref();
        // Event paths come back absolute; canonicalize so exclusion works.
        let root = root.canonicalize()?;

        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                // The receiver only goes away when the detector is dropped.
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(&root, RecursiveMode::Recursive)?;

        info!("file watcher started on {:?}", root);

        Ok(Self {
            _watcher: watcher,
            events: rx,
            root,
            exclude,
        })
    }

    fn is_relevant(&self, event: &Event) -> bool {
        if matches!(event.kind, EventKind::Access(_)) {
            return false;
        }
        event
            .paths
            .iter()
            .any(|path| !self.exclude.covers(&self.root, path))
    }
}

impl ChangeDetector for NotifyDetector {
    fn poll(&mut self) -> Result<bool> {
        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(Ok(event)) => {
                    if self.is_relevant(&event) {
                        debug!(?event, "relevant file event");
                        changed = true;
                    }
                }
                Ok(Err(err)) => warn!(error = %err, "file watch error"),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return Err(anyhow!("file watcher stopped unexpectedly").into());
                }
            }
        }
        Ok(changed)
    }
}

/// Build the detector selected by `[watch].detector`.
pub fn build_detector(cfg: &ConfigFile) -> Result<Box<dyn ChangeDetector>> {
    let exclude = ExcludeSet::new(&cfg.watch.exclude)?;
    let root = cfg.watch_dir();

    match cfg.watch.detector {
        DetectorKind::Poll => Ok(Box::new(PollingDetector::new(
            Arc::new(RealFileSystem),
            root,
            exclude,
            cfg.watch.recency_window,
        ))),
        DetectorKind::Notify => Ok(Box::new(NotifyDetector::new(root, exclude)?)),
    }
}
