// tests/process_supervision.rs

#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

use autobuild::exec::{ChildProcess, SupervisedProcess};

type TestResult = Result<(), Box<dyn Error>>;

fn write_script(dir: &Path, name: &str, body: &str) -> TestResult {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

fn pid_alive(pid: u32) -> bool {
    Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[tokio::test]
async fn stop_interrupts_the_program() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    write_script(
        dir.path(),
        "program.sh",
        r#"trap 'echo bye > interrupted; exit 0' INT
while :; do sleep 0.05; done"#,
    )?;

    let mut process = ChildProcess::new(
        dir.path().join("program.sh"),
        dir.path(),
        Duration::from_secs(5),
    );
    with_timeout("start", process.start()).await?;
    assert!(process.is_running());
    let pid = process.pid().expect("running child has a pid");

    // Give the shell time to install its trap.
    tokio::time::sleep(Duration::from_millis(200)).await;
    with_timeout("stop", process.stop()).await?;

    assert!(!process.is_running());
    assert!(!pid_alive(pid));
    assert!(dir.path().join("interrupted").exists(), "SIGINT trap should have run");
    Ok(())
}

#[tokio::test]
async fn program_ignoring_interrupt_is_killed_after_timeout() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    write_script(
        dir.path(),
        "stubborn.sh",
        r#"trap '' INT
while :; do sleep 0.05; done"#,
    )?;

    let mut process = ChildProcess::new(
        dir.path().join("stubborn.sh"),
        dir.path(),
        Duration::from_millis(300),
    );
    with_timeout("start", process.start()).await?;
    let pid = process.pid().expect("running child has a pid");
    tokio::time::sleep(Duration::from_millis(200)).await;

    let started = Instant::now();
    with_timeout("stop", process.stop()).await?;

    assert!(started.elapsed() >= Duration::from_millis(300));
    assert!(!pid_alive(pid));
    Ok(())
}

#[tokio::test]
async fn stopping_an_already_exited_program_is_fine() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    write_script(dir.path(), "oneshot.sh", "exit 0")?;

    let mut process = ChildProcess::new(
        dir.path().join("oneshot.sh"),
        dir.path(),
        Duration::from_secs(1),
    );
    with_timeout("start", process.start()).await?;
    tokio::time::sleep(Duration::from_millis(300)).await;

    with_timeout("stop", process.stop()).await?;
    assert!(!process.is_running());
    Ok(())
}

#[tokio::test]
async fn stop_without_start_is_a_noop() -> TestResult {
    init_tracing();

    let mut process = ChildProcess::new("./never", ".", Duration::from_secs(1));
    with_timeout("stop", process.stop()).await?;
    assert!(!process.is_running());
    Ok(())
}

#[tokio::test]
async fn missing_binary_fails_to_start() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let mut process = ChildProcess::new(
        dir.path().join("bin/program"),
        dir.path(),
        Duration::from_secs(1),
    );

    assert!(with_timeout("start", process.start()).await.is_err());
    assert!(!process.is_running());
}

#[tokio::test]
async fn restart_leaves_one_program_running() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    write_script(dir.path(), "server.sh", "exec sleep 30")?;

    let mut process = ChildProcess::new(
        dir.path().join("server.sh"),
        dir.path(),
        Duration::from_secs(2),
    );
    with_timeout("start", process.start()).await?;
    let first = process.pid().expect("pid");

    with_timeout("stop", process.stop()).await?;
    with_timeout("start", process.start()).await?;
    let second = process.pid().expect("pid");

    assert_ne!(first, second);
    assert!(!pid_alive(first));
    assert!(pid_alive(second));

    with_timeout("stop", process.stop()).await?;
    assert!(!pid_alive(second));
    Ok(())
}
