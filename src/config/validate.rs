// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use globset::Glob;

use crate::config::model::{
    ConfigFile, ProcessSettings, RawConfigFile, RawWatchSection, WatchSettings,
};
use crate::errors::{AutobuildError, Result};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::AutobuildError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let watch = validate_watch(&raw.watch)?;
        validate_commands(&raw)?;
        let process = ProcessSettings {
            stop_timeout: duration_field("process.stop_timeout", &raw.process.stop_timeout)?,
        };
        Ok(ConfigFile::new_unchecked(watch, raw.commands, process))
    }
}

fn duration_field(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| AutobuildError::ConfigError(format!("[{field}]: {e}")))
}

fn validate_watch(raw: &RawWatchSection) -> Result<WatchSettings> {
    if raw.dir.trim().is_empty() {
        return Err(AutobuildError::ConfigError(
            "[watch].dir must not be empty".to_string(),
        ));
    }

    let poll_interval = duration_field("watch.poll_interval", &raw.poll_interval)?;
    let recency_window = duration_field("watch.recency_window", &raw.recency_window)?;
    let settle_delay = duration_field("watch.settle_delay", &raw.settle_delay)?;

    if poll_interval.is_zero() {
        return Err(AutobuildError::ConfigError(
            "[watch].poll_interval must be greater than zero".to_string(),
        ));
    }

    // A poll interval at least as long as the window can step over a change
    // entirely.
    if poll_interval >= recency_window {
        return Err(AutobuildError::ConfigError(format!(
            "[watch].poll_interval ({:?}) must be shorter than [watch].recency_window ({:?})",
            poll_interval, recency_window
        )));
    }

    for pattern in raw.exclude.iter() {
        Glob::new(pattern).map_err(|e| {
            AutobuildError::ConfigError(format!(
                "invalid [watch].exclude pattern '{}': {}",
                pattern, e
            ))
        })?;
    }

    Ok(WatchSettings {
        dir: PathBuf::from(&raw.dir),
        poll_interval,
        recency_window,
        settle_delay,
        detector: raw.detector,
        exclude: raw.exclude.clone(),
    })
}

fn validate_commands(cfg: &RawConfigFile) -> Result<()> {
    if cfg.commands.build.trim().is_empty() {
        return Err(AutobuildError::ConfigError(
            "[commands].build must not be empty".to_string(),
        ));
    }
    if cfg.commands.program.trim().is_empty() {
        return Err(AutobuildError::ConfigError(
            "[commands].program must not be empty".to_string(),
        ));
    }
    Ok(())
}
