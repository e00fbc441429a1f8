// src/exec/process.rs

//! Supervision of the long-running program.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Context;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::errors::Result;

/// Capability to run one program at a time.
///
/// - `start` launches a new instance; callers `stop` the previous one first.
/// - `stop` asks the current instance to exit and forgets it. Stopping when
///   nothing is running is a no-op.
pub trait SupervisedProcess: Send {
    fn start(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    fn stop(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    fn is_running(&self) -> bool;
}

/// Real OS child process.
///
/// Stopping sends SIGINT (the same thing Ctrl-C in a terminal does), waits up
/// to `stop_timeout`, then kills the process if it is still around.
///
/// `program` should be absolute or a bare name found on `PATH`.
#[derive(Debug)]
pub struct ChildProcess {
    program: PathBuf,
    root: PathBuf,
    stop_timeout: Duration,
    child: Option<Child>,
}

impl ChildProcess {
    pub fn new(
        program: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
        stop_timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
            stop_timeout,
            child: None,
        }
    }

    /// OS process id of the current instance, if any.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.id())
    }

    async fn stop_inner(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            debug!("stop requested but no process is running");
            return Ok(());
        };

        if let Some(status) = child.try_wait()? {
            info!(exit_code = ?status.code(), "program had already exited");
            return Ok(());
        }

        interrupt(&mut child).await?;

        let waited = tokio::time::timeout(self.stop_timeout, child.wait()).await;
        match waited {
            Ok(status) => {
                let status = status.context("waiting for program to exit")?;
                info!(exit_code = ?status.code(), "program stopped");
            }
            Err(_) => {
                warn!(
                    timeout = ?self.stop_timeout,
                    "program ignored interrupt; killing it"
                );
                child.kill().await.context("killing program")?;
            }
        }

        Ok(())
    }
}

impl SupervisedProcess for ChildProcess {
    fn start(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if self.child.is_some() {
                warn!("start requested while a program is running; stopping it first");
                self.stop_inner().await?;
            }

            let child = Command::new(&self.program)
                .current_dir(&self.root)
                .kill_on_drop(true)
                .spawn()
                .with_context(|| format!("starting program {:?}", self.program))?;

            info!(program = ?self.program, pid = ?child.id(), "program started");
            self.child = Some(child);
            Ok(())
        })
    }

    fn stop(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(self.stop_inner())
    }

    fn is_running(&self) -> bool {
        self.child.is_some()
    }
}

/// Deliver SIGINT to the child.
///
/// A process that exited between `try_wait` and here (ESRCH) is fine.
#[cfg(unix)]
async fn interrupt(child: &mut Child) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return Ok(());
    };
    debug!(pid, "sending SIGINT");

    match kill(Pid::from_raw(pid as i32), Signal::SIGINT) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => {
            debug!(pid, "program exited before it could be interrupted");
            Ok(())
        }
        Err(errno) => Err(std::io::Error::from(errno).into()),
    }
}

/// No interrupt signal to send here; terminate outright.
#[cfg(not(unix))]
async fn interrupt(child: &mut Child) -> Result<()> {
    child.start_kill()?;
    Ok(())
}
