pub mod builders;
pub mod fake_backend;

use std::sync::Once;
use std::time::Duration;

use sysmaint::engine::TaskEvent;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Drain events up to and including `Completed`.
///
/// Panics if the run does not complete within 5 seconds.
pub async fn collect_until_completed(rx: &mut mpsc::Receiver<TaskEvent>) -> Vec<TaskEvent> {
    with_timeout(async {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            let done = event == TaskEvent::Completed;
            events.push(event);
            if done {
                break;
            }
        }
        events
    })
    .await
}

/// Output lines only, as `(text, is_error)`.
pub fn output_lines(events: &[TaskEvent]) -> Vec<(String, bool)> {
    events
        .iter()
        .filter_map(|e| match e {
            TaskEvent::Output { text, is_error } => Some((text.clone(), *is_error)),
            _ => None,
        })
        .collect()
}

/// Progress values in arrival order.
pub fn progress_values(events: &[TaskEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            TaskEvent::Progress(pct) => Some(*pct),
            _ => None,
        })
        .collect()
}
