// tests/runtime_fake_executor.rs

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::fakes::{Journal, RecordingProcess, RecordingRunner, ScriptedDetector};
use crate::common::init_tracing;

use std::error::Error;

use tokio::time::{sleep, Duration};

use autobuild::config::ConfigFile;
use autobuild::engine::Runtime;
use autobuild::errors::Result as AutobuildResult;
use autobuild::types::RunMode;
use autobuild::watch::ChangeDetector;

type TestResult = Result<(), Box<dyn Error>>;

/// Default timings: poll every 50ms, settle for 1s after a restart.
fn default_config() -> ConfigFile {
    ConfigFileBuilder::new().build()
}

fn without_polls(entries: Vec<String>) -> Vec<String> {
    entries.into_iter().filter(|e| e != "poll").collect()
}

#[tokio::test(start_paused = true)]
async fn untouched_tree_causes_no_action() -> TestResult {
    init_tracing();

    let journal = Journal::new();
    let runtime = Runtime::new(
        &default_config(),
        RunMode::Normal,
        ScriptedDetector::new(std::iter::empty(), journal.clone()),
        RecordingRunner::new(journal.clone()),
        RecordingProcess::new(journal.clone()),
    );

    runtime.run_until(sleep(Duration::from_secs(10))).await?;

    assert!(journal.count("poll") > 100, "loop should keep polling");
    assert_eq!(
        without_polls(journal.entries()),
        vec!["clean", "build", "start", "stop"],
        "only the initial build/start and the shutdown stop may happen"
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn change_stops_rebuilds_and_restarts_once() -> TestResult {
    init_tracing();

    let journal = Journal::new();
    let process = RecordingProcess::new(journal.clone());
    let max_alive = process.max_alive();

    let runtime = Runtime::new(
        &default_config(),
        RunMode::Normal,
        ScriptedDetector::new([false, true, false], journal.clone()),
        RecordingRunner::new(journal.clone()),
        process,
    );

    // Polls at 50ms (no change) and 100ms (change), then the 1s pause, then
    // a poll every 50ms from 1150ms until shutdown.
    runtime.run_until(sleep(Duration::from_millis(1525))).await?;

    let entries = journal.entries();
    assert_eq!(
        entries[..9],
        [
            "clean", "build", "start", "poll", "poll", "stop", "build", "start", "poll"
        ]
    );
    assert_eq!(entries.last().map(String::as_str), Some("stop"));
    assert_eq!(journal.count("build"), 2);
    assert_eq!(journal.count("start"), 2);
    assert_eq!(*max_alive.lock().unwrap(), 1, "never two programs at once");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn loop_pauses_for_settle_delay_after_restart() -> TestResult {
    init_tracing();

    let journal = Journal::new();
    let detector = ScriptedDetector::new([true, false], journal.clone());
    let polled_at = detector.polled_at();

    let runtime = Runtime::new(
        &default_config(),
        RunMode::Normal,
        detector,
        RecordingRunner::new(journal.clone()),
        RecordingProcess::new(journal.clone()),
    );

    runtime.run_until(sleep(Duration::from_secs(3))).await?;

    let polled_at = polled_at.lock().unwrap();
    let gap = polled_at[1] - polled_at[0];
    assert!(
        gap >= Duration::from_secs(1),
        "second poll came only {:?} after the restart",
        gap
    );
    let steady = polled_at[2] - polled_at[1];
    assert!(steady < Duration::from_millis(100));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn configured_timings_and_empty_clean_are_honoured() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .poll_interval("20ms")
        .recency_window("100ms")
        .settle_delay("250ms")
        .clean("")
        .build();

    let journal = Journal::new();
    let detector = ScriptedDetector::new([true, false, false], journal.clone());
    let polled_at = detector.polled_at();

    let runtime = Runtime::new(
        &cfg,
        RunMode::Normal,
        detector,
        RecordingRunner::new(journal.clone()),
        RecordingProcess::new(journal.clone()),
    );

    runtime.run_until(sleep(Duration::from_secs(1))).await?;

    assert_eq!(journal.count("clean"), 0, "empty clean command must not run");

    let polled_at = polled_at.lock().unwrap();
    let settle_gap = polled_at[1] - polled_at[0];
    assert!(settle_gap >= Duration::from_millis(250), "gap {:?}", settle_gap);
    assert!(settle_gap < Duration::from_secs(1), "gap {:?}", settle_gap);
    let steady = polled_at[2] - polled_at[1];
    assert!(steady >= Duration::from_millis(20) && steady < Duration::from_millis(50));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_mode_runs_tests_and_never_launches() -> TestResult {
    init_tracing();

    let journal = Journal::new();
    let runtime = Runtime::new(
        &default_config(),
        RunMode::Test,
        ScriptedDetector::new([true, false, true], journal.clone()),
        RecordingRunner::new(journal.clone()),
        RecordingProcess::new(journal.clone()),
    );

    runtime.run_until(sleep(Duration::from_secs(5))).await?;

    assert_eq!(journal.count("start"), 0);
    assert_eq!(journal.count("stop"), 0);
    assert_eq!(journal.count("build"), 3);
    assert_eq!(journal.count("test"), 3);
    assert_eq!(
        without_polls(journal.entries()),
        vec!["clean", "build", "test", "build", "test", "build", "test"]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_build_still_launches_program() -> TestResult {
    init_tracing();

    let journal = Journal::new();
    let runtime = Runtime::new(
        &ConfigFileBuilder::new().clean_on_start(false).build(),
        RunMode::Normal,
        ScriptedDetector::new([true], journal.clone()),
        RecordingRunner::failing(journal.clone()),
        RecordingProcess::new(journal.clone()),
    );

    runtime.run_until(sleep(Duration::from_secs(2))).await?;

    assert_eq!(
        without_polls(journal.entries()),
        vec!["build", "start", "stop", "build", "start", "stop"]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn missing_binary_does_not_stop_the_loop() -> TestResult {
    init_tracing();

    let journal = Journal::new();
    let runtime = Runtime::new(
        &default_config(),
        RunMode::Normal,
        ScriptedDetector::new([true], journal.clone()),
        RecordingRunner::new(journal.clone()),
        RecordingProcess::missing_binary(journal.clone()),
    );

    runtime.run_until(sleep(Duration::from_secs(2))).await?;

    // Nothing ever started, so there is never anything to stop.
    assert_eq!(
        without_polls(journal.entries()),
        vec!["clean", "build", "start", "build", "start"]
    );
    assert!(journal.count("poll") > 1, "loop kept polling after the failure");
    Ok(())
}

struct VanishedDirDetector;

impl ChangeDetector for VanishedDirDetector {
    fn poll(&mut self) -> AutobuildResult<bool> {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "src vanished").into())
    }
}

#[tokio::test(start_paused = true)]
async fn detection_failure_ends_the_loop_with_an_error() {
    init_tracing();

    let journal = Journal::new();
    let runtime = Runtime::new(
        &default_config(),
        RunMode::Normal,
        VanishedDirDetector,
        RecordingRunner::new(journal.clone()),
        RecordingProcess::new(journal.clone()),
    );

    let result = runtime.run_until(sleep(Duration::from_secs(60))).await;
    assert!(result.is_err());
    assert_eq!(journal.count("build"), 1);
}
