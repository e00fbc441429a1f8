// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::RunMode;

/// Command-line arguments for `autobuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "autobuild",
    version,
    about = "Rebuild and restart a program whenever its sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// `normal` rebuilds and restarts the program; `test` rebuilds and runs
    /// the test command instead.
    #[arg(value_enum, value_name = "MODE")]
    pub mode: Option<RunMode>,

    /// Path to the config file (TOML).
    ///
    /// If omitted, `Autobuild.toml` in the current directory is used when it
    /// exists; otherwise built-in defaults apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AUTOBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate the config, print it, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn run_mode(&self) -> RunMode {
        self.mode.unwrap_or_default()
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_defaults_to_normal() {
        let args = CliArgs::try_parse_from(["autobuild"]).unwrap();
        assert_eq!(args.run_mode(), RunMode::Normal);
        assert!(args.config.is_none());
    }

    #[test]
    fn positional_test_selects_test_mode() {
        let args =
            CliArgs::try_parse_from(["autobuild", "test", "--config", "x.toml"]).unwrap();
        assert_eq!(args.run_mode(), RunMode::Test);
        assert_eq!(args.config.as_deref(), Some("x.toml"));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(CliArgs::try_parse_from(["autobuild", "release"]).is_err());
    }
}
