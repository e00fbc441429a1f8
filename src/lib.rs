// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{resolve_config, ConfigFile};
use crate::engine::Runtime;
use crate::exec::{ChildProcess, ShellCommandRunner};
use crate::types::RunMode;
use crate::watch::build_detector;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file or built-in defaults)
/// - the change detector
/// - the shell command runner and the supervised program
/// - the loop runtime, stopped by Ctrl-C
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(args.config.as_deref().map(Path::new))?;
    let mode = args.run_mode();

    if args.dry_run {
        print_dry_run(&cfg, mode);
        return Ok(());
    }

    info!(root = ?cfg.root, watch = ?cfg.watch_dir(), ?mode, "starting autobuild");

    let detector = build_detector(&cfg)?;
    let runner = ShellCommandRunner::new(&cfg.root);
    let process = ChildProcess::new(cfg.program_path(), &cfg.root, cfg.process.stop_timeout);

    let runtime = Runtime::new(&cfg, mode, detector, runner, process);
    runtime.run().await?;
    Ok(())
}

/// Simple dry-run output: print the resolved configuration.
fn print_dry_run(cfg: &ConfigFile, mode: RunMode) {
    println!("autobuild dry-run");
    println!("  mode = {:?}", mode);
    println!("  root = {}", cfg.root.display());
    println!();

    println!("watch:");
    println!("  dir = {}", cfg.watch_dir().display());
    println!("  detector = {:?}", cfg.watch.detector);
    println!("  poll_interval = {:?}", cfg.watch.poll_interval);
    println!("  recency_window = {:?}", cfg.watch.recency_window);
    println!("  settle_delay = {:?}", cfg.watch.settle_delay);
    if !cfg.watch.exclude.is_empty() {
        println!("  exclude = {:?}", cfg.watch.exclude);
    }
    println!();

    println!("commands:");
    if cfg.commands.clean_on_start && !cfg.commands.clean.is_empty() {
        println!("  clean (on start): {}", cfg.commands.clean);
    }
    println!("  build: {}", cfg.commands.build);
    match mode {
        RunMode::Normal => {
            println!("  program: {}", cfg.program_path().display());
            println!("  stop_timeout: {:?}", cfg.process.stop_timeout);
        }
        RunMode::Test => println!("  test: {}", cfg.commands.test),
    }

    debug!("dry-run complete (no execution)");
}
