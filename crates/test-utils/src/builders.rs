use autobuild::config::{ConfigFile, RawConfigFile};
use autobuild::types::DetectorKind;

/// Test-side [`ConfigFile`] builder. Starts from the built-in defaults and
/// overrides only what a test cares about; durations take the same strings
/// as `Autobuild.toml`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn poll_interval(mut self, duration: &str) -> Self {
        self.config.watch.poll_interval = duration.to_string();
        self
    }

    pub fn recency_window(mut self, duration: &str) -> Self {
        self.config.watch.recency_window = duration.to_string();
        self
    }

    pub fn settle_delay(mut self, duration: &str) -> Self {
        self.config.watch.settle_delay = duration.to_string();
        self
    }

    pub fn detector(mut self, kind: DetectorKind) -> Self {
        self.config.watch.detector = kind;
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn clean(mut self, cmd: &str) -> Self {
        self.config.commands.clean = cmd.to_string();
        self
    }

    pub fn clean_on_start(mut self, val: bool) -> Self {
        self.config.commands.clean_on_start = val;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
