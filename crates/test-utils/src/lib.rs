//! Shared helpers for the `autobuild` integration tests: config builders,
//! recording fakes for the loop's collaborators, and test logging.

pub mod builders;
pub mod fakes;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING: Once = Once::new();

/// How long a real child process gets before a test gives up on it.
pub const PROCESS_DEADLINE: Duration = Duration::from_secs(10);

/// Route `tracing` output into the test harness.
///
/// Output only shows up for failing tests (or with `--nocapture`). The filter
/// comes from `RUST_LOG` and falls back to `info`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .init();
    });
}

/// Await `fut`, panicking with `what` if it outlives [`PROCESS_DEADLINE`].
pub async fn with_timeout<F, T>(what: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(PROCESS_DEADLINE, fut).await {
        Ok(out) => out,
        Err(_) => panic!("{what} did not finish within {PROCESS_DEADLINE:?}"),
    }
}
