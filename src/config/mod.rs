// src/config/mod.rs

//! Configuration loading and validation for autobuild.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate and type the raw values (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, resolve_config};
pub use model::{
    CommandSection, ConfigFile, ProcessSettings, RawConfigFile, RawProcessSection,
    RawWatchSection, WatchSettings,
};
