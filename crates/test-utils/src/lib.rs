//! Shared helpers for `lerobot-runner` integration tests.

pub mod builders;
pub mod fake_bin;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use lerobot_runner::logging::LOG_ENV_VAR;
use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for any single awaited step in a test. Runner tests spawn
/// real shell processes, so this is generous.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Reads the same `LEROBOT_RUNNER_LOG` directives as the binary and defaults
/// to `warn`, so passing runs stay quiet. Output is only shown for failing
/// tests unless `--nocapture` is given.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, panicking if it takes longer than [`TEST_TIMEOUT`]. A hung
/// child or a stuck worker then fails the test instead of the whole run.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test step did not finish within {TEST_TIMEOUT:?}"),
    }
}
