// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// typed durations and checked invariants.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// The project root becomes the directory containing the config file.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config.with_root(config_root_dir(path)))
}

/// Resolve the configuration the CLI asked for.
///
/// - An explicit path must exist.
/// - Without one, `Autobuild.toml` is used if present; otherwise built-in
///   defaults rooted at the current directory.
pub fn resolve_config(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        return load_and_validate(&default_path);
    }

    debug!(path = ?default_path, "no config file found; using built-in defaults");
    let config = ConfigFile::try_from(RawConfigFile::default())?;
    Ok(config.with_root(current_dir()))
}

/// Default config file name, looked up in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Autobuild.toml")
}

/// Figure out the project root for a config file.
///
/// - If the config path has a non-empty parent (e.g. "tools/Autobuild.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Autobuild.toml" (parent = ""),
///   we fall back to the current working directory.
///
/// The result is always absolute so the program path never depends on how
/// the OS resolves relative paths against a child's working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            if parent.is_absolute() {
                parent.to_path_buf()
            } else {
                current_dir().join(parent)
            }
        }
        _ => current_dir(),
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
