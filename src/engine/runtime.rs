// src/engine/runtime.rs

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::{CommandSection, ConfigFile};
use crate::engine::{CoreLoop, LoopCommand, LoopOptions};
use crate::errors::Result;
use crate::exec::{CommandKind, CommandRunner, SupervisedProcess};
use crate::types::RunMode;
use crate::watch::ChangeDetector;

/// Async shell around [`CoreLoop`].
///
/// Owns the detector, the command runner and the supervised program, and is
/// the only place where time passes: the poll interval, the settle pause, and
/// the awaited commands.
pub struct Runtime<D, R, P>
where
    D: ChangeDetector,
    R: CommandRunner,
    P: SupervisedProcess,
{
    core: CoreLoop,
    detector: D,
    runner: R,
    process: P,
    commands: CommandSection,
    poll_interval: Duration,
}

impl<D, R, P> fmt::Debug for Runtime<D, R, P>
where
    D: ChangeDetector,
    R: CommandRunner,
    P: SupervisedProcess,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl<D, R, P> Runtime<D, R, P>
where
    D: ChangeDetector,
    R: CommandRunner,
    P: SupervisedProcess,
{
    pub fn new(
        cfg: &ConfigFile,
        mode: RunMode,
        detector: D,
        runner: R,
        process: P,
    ) -> Self {
        let options = LoopOptions {
            mode,
            settle_delay: cfg.watch.settle_delay,
            // An empty clean command switches the clean step off.
            clean_on_start: cfg.commands.clean_on_start
                && !cfg.commands.clean.trim().is_empty(),
        };

        Self {
            core: CoreLoop::new(options),
            detector,
            runner,
            process,
            commands: cfg.commands.clone(),
            poll_interval: cfg.watch.poll_interval,
        }
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl+C");
                // Without a shutdown signal, run until killed.
                std::future::pending::<()>().await;
            }
            info!("Ctrl+C received; shutting down");
        })
        .await
    }

    /// Run until `shutdown` resolves, then stop the program.
    ///
    /// Returns early with an error only when change detection fails (e.g.
    /// the watched directory disappeared). Build, test and start failures
    /// are logged and the loop keeps going.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            mode = ?self.core.mode(),
            poll_interval = ?self.poll_interval,
            "autobuild loop started"
        );

        let startup = self.core.startup();
        let mut keep_running = self.execute_all(startup, shutdown.as_mut()).await?;

        while keep_running {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = sleep(self.poll_interval) => {}
            }

            let changed = self.detector.poll()?;
            if changed {
                info!("change detected; rebuilding");
            }

            let commands = self.core.on_poll(changed);
            keep_running = self.execute_all(commands, shutdown.as_mut()).await?;
        }

        let commands = self.core.on_shutdown();
        for command in commands {
            self.execute(command).await?;
        }

        info!(rebuilds = self.core.rebuilds(), "autobuild loop exiting");
        Ok(())
    }

    /// Execute commands in order. Returns `false` if shutdown fired during a
    /// pause.
    async fn execute_all<F>(
        &mut self,
        commands: Vec<LoopCommand>,
        mut shutdown: Pin<&mut F>,
    ) -> Result<bool>
    where
        F: Future<Output = ()>,
    {
        for command in commands {
            if let LoopCommand::Pause(delay) = command {
                debug!(?delay, "settling");
                tokio::select! {
                    _ = &mut shutdown => return Ok(false),
                    _ = sleep(delay) => {}
                }
                continue;
            }
            self.execute(command).await?;
        }
        Ok(true)
    }

    async fn execute(&mut self, command: LoopCommand) -> Result<()> {
        match command {
            LoopCommand::RunClean => {
                self.run_command(CommandKind::Clean).await;
            }
            LoopCommand::RunBuild => {
                // A failed build still goes on to (re)start whatever binary
                // is there.
                self.run_command(CommandKind::Build).await;
            }
            LoopCommand::RunTests => {
                self.run_command(CommandKind::Test).await;
            }
            LoopCommand::StopProcess => {
                if let Err(e) = self.process.stop().await {
                    warn!(error = %e, "failed to stop program");
                }
            }
            LoopCommand::StartProcess => {
                if let Err(e) = self.process.start().await {
                    error!(error = %e, "failed to start program; waiting for the next change");
                    self.core.process_lost();
                }
            }
            LoopCommand::Pause(delay) => sleep(delay).await,
        }
        Ok(())
    }

    /// Run one configured command. Failing to even launch the shell is
    /// logged like a failed command.
    async fn run_command(&mut self, kind: CommandKind) {
        let cmd = match kind {
            CommandKind::Clean => &self.commands.clean,
            CommandKind::Build => &self.commands.build,
            CommandKind::Test => &self.commands.test,
        };

        match self.runner.run(kind, cmd).await {
            Ok(outcome) if !outcome.success => {
                debug!(%kind, exit_code = ?outcome.exit_code, "continuing after failed command");
            }
            Ok(_) => {}
            Err(e) => error!(%kind, error = %e, "could not run command"),
        }
    }
}
