//! Recording stand-ins for the loop's collaborators.
//!
//! All fakes append to one shared [`Journal`], so a test can assert on the
//! exact interleaving of builds, stops and starts.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use autobuild::errors::Result;
use autobuild::exec::{CommandKind, CommandOutcome, CommandRunner, SupervisedProcess};
use autobuild::watch::ChangeDetector;

/// Shared, ordered log of what the fakes were asked to do.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries.lock().unwrap().iter().filter(|e| *e == entry).count()
    }
}

/// Command runner that records `clean` / `build` / `test` and reports the
/// configured success.
pub struct RecordingRunner {
    journal: Journal,
    succeed: bool,
}

impl RecordingRunner {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            succeed: true,
        }
    }

    /// Every command reports exit code 2.
    pub fn failing(journal: Journal) -> Self {
        Self {
            journal,
            succeed: false,
        }
    }
}

impl CommandRunner for RecordingRunner {
    fn run<'a>(
        &'a mut self,
        kind: CommandKind,
        _cmd: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutcome>> + Send + 'a>> {
        self.journal.push(kind.to_string());
        let succeed = self.succeed;
        Box::pin(async move {
            Ok(CommandOutcome {
                kind,
                success: succeed,
                exit_code: Some(if succeed { 0 } else { 2 }),
            })
        })
    }
}

/// Supervised process that records `start` / `stop` and tracks how many
/// instances are alive at once.
pub struct RecordingProcess {
    journal: Journal,
    running: bool,
    fail_start: bool,
    max_alive: Arc<Mutex<usize>>,
}

impl RecordingProcess {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            running: false,
            fail_start: false,
            max_alive: Arc::new(Mutex::new(0)),
        }
    }

    /// `start` always fails, as if the binary were missing.
    pub fn missing_binary(journal: Journal) -> Self {
        Self {
            fail_start: true,
            ..Self::new(journal)
        }
    }

    /// Highest number of simultaneously running instances seen.
    pub fn max_alive(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.max_alive)
    }
}

impl SupervisedProcess for RecordingProcess {
    fn start(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.journal.push("start");
            if self.fail_start {
                return Err(anyhow::anyhow!("no such file: ./bin/program").into());
            }
            let alive = if self.running { 2 } else { 1 };
            {
                let mut max = self.max_alive.lock().unwrap();
                *max = (*max).max(alive);
            }
            self.running = true;
            Ok(())
        })
    }

    fn stop(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.journal.push("stop");
            self.running = false;
            Ok(())
        })
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Detector that replays a fixed script of poll results, then reports "no
/// change" forever. Every poll is journalled as `poll` and timestamped.
pub struct ScriptedDetector {
    script: VecDeque<bool>,
    journal: Journal,
    polled_at: Arc<Mutex<Vec<Instant>>>,
}

impl ScriptedDetector {
    pub fn new(script: impl IntoIterator<Item = bool>, journal: Journal) -> Self {
        Self {
            script: script.into_iter().collect(),
            journal,
            polled_at: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn polled_at(&self) -> Arc<Mutex<Vec<Instant>>> {
        Arc::clone(&self.polled_at)
    }
}

impl ChangeDetector for ScriptedDetector {
    fn poll(&mut self) -> Result<bool> {
        self.journal.push("poll");
        self.polled_at.lock().unwrap().push(Instant::now());
        Ok(self.script.pop_front().unwrap_or(false))
    }
}

/// Wraps a real detector and journals each poll as `poll`, so tests against a
/// real directory can count polls the same way as with [`ScriptedDetector`].
pub struct JournalledDetector<D> {
    inner: D,
    journal: Journal,
}

impl<D: ChangeDetector> JournalledDetector<D> {
    pub fn new(inner: D, journal: Journal) -> Self {
        Self { inner, journal }
    }
}

impl<D: ChangeDetector> ChangeDetector for JournalledDetector<D> {
    fn poll(&mut self) -> Result<bool> {
        self.journal.push("poll");
        self.inner.poll()
    }
}
