// src/engine/mod.rs

//! The watch-build-run loop.
//!
//! The pure decision logic lives in [`core`]: it is told whether the tree
//! changed and answers with a list of [`LoopCommand`]s. The async shell in
//! [`runtime`] polls the detector, feeds the core, and carries the commands
//! out against a `CommandRunner` and a `SupervisedProcess`.

use std::time::Duration;

use crate::types::RunMode;

/// One step the shell has to perform, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCommand {
    RunClean,
    RunBuild,
    RunTests,
    /// Interrupt the current program and forget it.
    StopProcess,
    StartProcess,
    /// Sleep before polling again.
    Pause(Duration),
}

/// Options shared by the core and the shell.
#[derive(Debug, Clone, Copy)]
pub struct LoopOptions {
    pub mode: RunMode,
    pub settle_delay: Duration,
    pub clean_on_start: bool,
}

pub mod core;
pub mod runtime;

pub use core::CoreLoop;
pub use runtime::Runtime;
