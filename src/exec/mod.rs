// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] runs the clean / build / test commands to completion
//!   through the platform shell (`CommandRunner`).
//! - [`process`] supervises the single long-running program
//!   (`SupervisedProcess`): start it, interrupt it, reap it.
//!
//! Both are traits so the runtime can be driven by fakes in tests.

pub mod command;
pub mod process;

pub use command::{CommandKind, CommandOutcome, CommandRunner, ShellCommandRunner};
pub use process::{ChildProcess, SupervisedProcess};
