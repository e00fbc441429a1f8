// src/engine/core.rs

//! Pure core of the loop.
//!
//! No Tokio, no processes, no filesystem: the core only tracks whether a
//! program instance is current and turns poll results into commands. The
//! invariants live here:
//!
//! - at most one program instance is current,
//! - each detected change yields exactly one `RunBuild` and at most one
//!   `StartProcess`,
//! - test mode never yields `StartProcess`.

use crate::engine::{LoopCommand, LoopOptions};
use crate::types::RunMode;

#[derive(Debug)]
pub struct CoreLoop {
    options: LoopOptions,
    process_current: bool,
    rebuilds: u64,
}

impl CoreLoop {
    pub fn new(options: LoopOptions) -> Self {
        Self {
            options,
            process_current: false,
            rebuilds: 0,
        }
    }

    pub fn mode(&self) -> RunMode {
        self.options.mode
    }

    /// Whether a program instance is considered current.
    pub fn process_current(&self) -> bool {
        self.process_current
    }

    /// Number of change-triggered rebuilds so far (the initial build is not
    /// counted).
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Commands for the initial build before the first poll.
    pub fn startup(&mut self) -> Vec<LoopCommand> {
        let mut commands = Vec::with_capacity(3);
        if self.options.clean_on_start {
            commands.push(LoopCommand::RunClean);
        }
        commands.push(LoopCommand::RunBuild);
        commands.push(self.after_build());
        commands
    }

    /// Commands in response to one poll.
    pub fn on_poll(&mut self, changed: bool) -> Vec<LoopCommand> {
        if !changed {
            return Vec::new();
        }

        self.rebuilds += 1;

        let mut commands = Vec::with_capacity(4);
        if self.process_current {
            commands.push(LoopCommand::StopProcess);
            self.process_current = false;
        }
        commands.push(LoopCommand::RunBuild);
        commands.push(self.after_build());
        commands.push(LoopCommand::Pause(self.options.settle_delay));
        commands
    }

    /// Commands to leave nothing running behind.
    pub fn on_shutdown(&mut self) -> Vec<LoopCommand> {
        if self.process_current {
            self.process_current = false;
            vec![LoopCommand::StopProcess]
        } else {
            Vec::new()
        }
    }

    /// The shell failed to start the program; nothing is current.
    pub fn process_lost(&mut self) {
        self.process_current = false;
    }

    fn after_build(&mut self) -> LoopCommand {
        match self.options.mode {
            RunMode::Normal => {
                self.process_current = true;
                LoopCommand::StartProcess
            }
            RunMode::Test => LoopCommand::RunTests,
        }
    }
}
