// src/exec/command.rs

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::Result;

/// Which of the configured commands is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Clean,
    Build,
    Test,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandKind::Clean => "clean",
            CommandKind::Build => "build",
            CommandKind::Test => "test",
        };
        f.write_str(name)
    }
}

/// How a finished command went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub kind: CommandKind,
    pub success: bool,
    /// `None` when the command was killed by a signal or skipped.
    pub exit_code: Option<i32>,
}

impl CommandOutcome {
    pub fn skipped(kind: CommandKind) -> Self {
        Self {
            kind,
            success: true,
            exit_code: None,
        }
    }
}

/// Runs a configured command to completion.
///
/// Production code uses [`ShellCommandRunner`]; tests plug in a recorder.
pub trait CommandRunner: Send {
    fn run<'a>(
        &'a mut self,
        kind: CommandKind,
        cmd: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutcome>> + Send + 'a>>;
}

/// Runs commands through `sh -c` (or `cmd /C` on Windows) in the project
/// root, with stdio inherited so compiler output lands in the terminal.
#[derive(Debug, Clone)]
pub struct ShellCommandRunner {
    root: PathBuf,
}

impl ShellCommandRunner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl CommandRunner for ShellCommandRunner {
    fn run<'a>(
        &'a mut self,
        kind: CommandKind,
        cmd: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutcome>> + Send + 'a>> {
        Box::pin(async move {
            if cmd.trim().is_empty() {
                debug!(%kind, "no command configured; skipping");
                return Ok(CommandOutcome::skipped(kind));
            }

            info!(%kind, cmd = %cmd, "running command");

            let status = shell_command(cmd)
                .current_dir(&self.root)
                .status()
                .await
                .with_context(|| format!("running {kind} command '{cmd}'"))?;

            let outcome = CommandOutcome {
                kind,
                success: status.success(),
                exit_code: status.code(),
            };

            if outcome.success {
                info!(%kind, "command finished");
            } else {
                warn!(%kind, exit_code = ?outcome.exit_code, "command failed");
            }

            Ok(outcome)
        })
    }
}

/// Build a shell command appropriate for the platform.
fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}
