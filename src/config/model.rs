// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::types::DetectorKind;

/// Top-level configuration exactly as read from TOML.
///
/// ```toml
/// [watch]
/// dir = "src"
/// poll_interval = "50ms"
/// recency_window = "200ms"
/// settle_delay = "1s"
///
/// [commands]
/// build = "make all"
/// program = "./bin/program"
/// ```
///
/// All sections are optional; an empty file is equivalent to the built-in
/// defaults. Durations are kept as strings here and typed by
/// `ConfigFile::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: RawWatchSection,

    #[serde(default)]
    pub commands: CommandSection,

    #[serde(default)]
    pub process: RawProcessSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWatchSection {
    /// Directory to watch, relative to the project root.
    #[serde(default = "default_watch_dir")]
    pub dir: String,

    /// How long to wait between two change checks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// The latest directory mtime must be at most this old for the tree to
    /// count as changed.
    #[serde(default = "default_recency_window")]
    pub recency_window: String,

    /// Pause after each restart so bursts of writes don't trigger a rebuild
    /// per file.
    #[serde(default = "default_settle_delay")]
    pub settle_delay: String,

    #[serde(default)]
    pub detector: DetectorKind,

    /// Glob patterns (relative to the watched dir) of directories to skip.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_watch_dir() -> String {
    "src".to_string()
}

fn default_poll_interval() -> String {
    "50ms".to_string()
}

fn default_recency_window() -> String {
    "200ms".to_string()
}

fn default_settle_delay() -> String {
    "1s".to_string()
}

impl Default for RawWatchSection {
    fn default() -> Self {
        Self {
            dir: default_watch_dir(),
            poll_interval: default_poll_interval(),
            recency_window: default_recency_window(),
            settle_delay: default_settle_delay(),
            detector: DetectorKind::default(),
            exclude: Vec::new(),
        }
    }
}

/// `[commands]` section.
///
/// Every command is a single shell string. An empty `clean` or `test`
/// command is skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSection {
    #[serde(default = "default_clean_cmd")]
    pub clean: String,

    #[serde(default = "default_build_cmd")]
    pub build: String,

    #[serde(default = "default_test_cmd")]
    pub test: String,

    /// Program launched (without arguments) after each build in normal mode.
    #[serde(default = "default_program")]
    pub program: String,

    /// Run `clean` once before the very first build.
    #[serde(default = "default_clean_on_start")]
    pub clean_on_start: bool,
}

fn default_clean_cmd() -> String {
    "make clean".to_string()
}

fn default_build_cmd() -> String {
    "make all".to_string()
}

fn default_test_cmd() -> String {
    "make test".to_string()
}

fn default_program() -> String {
    "./bin/program".to_string()
}

fn default_clean_on_start() -> bool {
    true
}

impl Default for CommandSection {
    fn default() -> Self {
        Self {
            clean: default_clean_cmd(),
            build: default_build_cmd(),
            test: default_test_cmd(),
            program: default_program(),
            clean_on_start: default_clean_on_start(),
        }
    }
}

/// `[process]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProcessSection {
    /// How long to wait for the program to exit after SIGINT before it is
    /// killed outright.
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout: String,
}

fn default_stop_timeout() -> String {
    "2s".to_string()
}

impl Default for RawProcessSection {
    fn default() -> Self {
        Self {
            stop_timeout: default_stop_timeout(),
        }
    }
}

/// Validated `[watch]` settings.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub dir: PathBuf,
    pub poll_interval: Duration,
    pub recency_window: Duration,
    pub settle_delay: Duration,
    pub detector: DetectorKind,
    pub exclude: Vec<String>,
}

/// Validated `[process]` settings.
#[derive(Debug, Clone)]
pub struct ProcessSettings {
    pub stop_timeout: Duration,
}

/// Validated configuration.
///
/// Can only be built through `TryFrom<RawConfigFile>`, so every duration is
/// parsed and every invariant checked.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Directory commands run in and relative paths resolve against.
    pub root: PathBuf,
    pub watch: WatchSettings,
    pub commands: CommandSection,
    pub process: ProcessSettings,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        watch: WatchSettings,
        commands: CommandSection,
        process: ProcessSettings,
    ) -> Self {
        Self {
            root: PathBuf::from("."),
            watch,
            commands,
            process,
        }
    }

    /// Re-anchor relative paths on a different project root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Absolute-or-root-relative path of the watched directory.
    pub fn watch_dir(&self) -> PathBuf {
        self.root.join(&self.watch.dir)
    }

    /// Path used to launch the program.
    ///
    /// Anything that looks like a path is resolved against the root; a bare
    /// name is left alone so it is looked up on `PATH`.
    pub fn program_path(&self) -> PathBuf {
        let program = Path::new(&self.commands.program);
        if program.components().count() > 1 || program.is_absolute() {
            self.root.join(program)
        } else {
            program.to_path_buf()
        }
    }
}
