//! Shared helpers for slotdag's integration tests.

pub mod builders;
pub mod fake_executor;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static TRACING: Once = Once::new();

/// Upper bound for any async test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test-captured subscriber once per test binary.
///
/// The filter comes from `SLOTDAG_LOG` (same syntax as `RUST_LOG`), falling
/// back to `warn` so scheduler chatter stays out of failing-test output.
/// `SLOTDAG_LOG=slotdag=debug cargo test -- --nocapture` shows everything.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env("SLOTDAG_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `fut`, panicking if it outlives [`TEST_TIMEOUT`].
///
/// A stuck run loop (e.g. a task that never reports its exit) shows up as a
/// panic instead of a hung test.
pub async fn with_timeout<F, T>(fut: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(out) => out,
        Err(_) => panic!("test did not finish within {TEST_TIMEOUT:?}"),
    }
}
