// tests/coordinator_gate.rs
mod common;
use crate::common::{collect_until_completed, init_tracing, with_timeout};

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Barrier;

use sysmaint::engine::{RejectReason, SubmitOutcome, TaskCoordinator, TaskEvent};
use sysmaint::errors::MaintError;
use sysmaint::fs::{DeletionFailure, DeletionSummary};
use sysmaint_test_utils::builders::{registry_of, ActionBuilder};
use sysmaint_test_utils::fake_backend::FakeBackend;

type TestResult = Result<(), Box<dyn Error>>;

fn two_actions() -> sysmaint::registry::ActionRegistry {
    registry_of([
        ActionBuilder::new("scan").run("scanner", &["/all"]).build(),
        ActionBuilder::new("other").fixed("noop", &[]).build(),
    ])
}

#[tokio::test]
async fn second_submit_while_running_is_rejected_not_queued() -> TestResult {
    init_tracing();

    let (backend, release) = FakeBackend::new().with_hold();
    let probe = backend.clone();
    let (coordinator, mut rx) = TaskCoordinator::with_channel(two_actions(), backend, 64);

    assert_eq!(coordinator.submit("scan")?, SubmitOutcome::Accepted);
    assert!(coordinator.is_running());

    // Rejected for the same and for a different action, repeatedly.
    for name in ["scan", "other", "scan"] {
        assert_eq!(
            coordinator.submit(name)?,
            SubmitOutcome::Rejected(RejectReason::Busy)
        );
    }

    release.notify_one();
    let events = collect_until_completed(&mut rx).await;

    assert_eq!(
        events.iter().filter(|e| **e == TaskEvent::Completed).count(),
        1
    );
    // Only the first submit ever reached the backend.
    assert_eq!(probe.call_labels(), vec!["scanner /all"]);
    assert!(!coordinator.is_running());

    Ok(())
}

#[tokio::test]
async fn gate_reopens_once_completed_is_observed() -> TestResult {
    init_tracing();

    let backend = FakeBackend::new();
    let probe = backend.clone();
    let (coordinator, mut rx) = TaskCoordinator::with_channel(two_actions(), backend, 64);

    assert_eq!(coordinator.submit("scan")?, SubmitOutcome::Accepted);
    collect_until_completed(&mut rx).await;

    assert!(!coordinator.is_running());
    assert!(coordinator.current_run().is_none());
    assert_eq!(coordinator.submit("other")?, SubmitOutcome::Accepted);
    collect_until_completed(&mut rx).await;

    assert_eq!(probe.call_labels(), vec!["scanner /all", "noop"]);
    Ok(())
}

#[tokio::test]
async fn unknown_action_is_an_error_and_leaves_gate_closed() -> TestResult {
    init_tracing();

    let (coordinator, _rx) = TaskCoordinator::with_channel(two_actions(), FakeBackend::new(), 8);

    match coordinator.submit("format-c") {
        Err(MaintError::UnknownAction(name)) => assert_eq!(name, "format-c"),
        other => panic!("expected UnknownAction, got {other:?}"),
    }
    assert!(!coordinator.is_running());

    Ok(())
}

#[tokio::test]
async fn current_run_tracks_active_step() -> TestResult {
    init_tracing();

    let registry = registry_of([ActionBuilder::new("multi")
        .fixed("first", &[])
        .run("second", &[])
        .fixed("third", &[])
        .build()]);
    let (backend, release) = FakeBackend::new().with_hold();
    let (coordinator, mut rx) = TaskCoordinator::with_channel(registry, backend, 64);

    coordinator.submit("multi")?;

    // Wait until the held command has announced itself.
    with_timeout(async {
        while let Some(event) = rx.recv().await {
            if matches!(&event, TaskEvent::Output { text, .. } if text == "Starting: second") {
                break;
            }
        }
    })
    .await;

    let run = coordinator.current_run().expect("run is active");
    assert_eq!(run.action, "multi");
    assert_eq!(run.step_index, 1);
    assert_eq!(run.step_count, 3);

    release.notify_one();
    collect_until_completed(&mut rx).await;
    assert!(coordinator.current_run().is_none());

    Ok(())
}

#[tokio::test]
async fn action_without_steps_still_completes() -> TestResult {
    init_tracing();

    let registry = registry_of([ActionBuilder::new("empty").build()]);
    let (coordinator, mut rx) = TaskCoordinator::with_channel(registry, FakeBackend::new(), 8);

    coordinator.submit("empty")?;
    let events = collect_until_completed(&mut rx).await;

    assert_eq!(events.len(), 2, "summary line plus Completed: {events:?}");
    assert!(matches!(&events[0], TaskEvent::Output { text, is_error: false } if text.starts_with("=== empty finished")));
    assert_eq!(events[1], TaskEvent::Completed);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_submits_admit_exactly_one_run() -> TestResult {
    init_tracing();

    let (backend, release) = FakeBackend::new().with_hold();
    let probe = backend.clone();
    let (coordinator, mut rx) = TaskCoordinator::with_channel(two_actions(), backend, 64);
    let coordinator = Arc::new(coordinator);

    let contenders = 16;
    let start = Arc::new(Barrier::new(contenders));
    let mut handles = Vec::new();
    for _ in 0..contenders {
        let coordinator = Arc::clone(&coordinator);
        let start = Arc::clone(&start);
        handles.push(tokio::spawn(async move {
            start.wait().await;
            coordinator.submit("scan")
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await?? {
            SubmitOutcome::Accepted => accepted += 1,
            SubmitOutcome::Rejected(reason) => assert_eq!(reason, RejectReason::Busy),
        }
    }
    assert_eq!(accepted, 1);

    release.notify_one();
    let events = collect_until_completed(&mut rx).await;
    assert_eq!(events.last(), Some(&TaskEvent::Completed));
    assert_eq!(probe.calls().len(), 1);
    assert!(!coordinator.is_running());

    Ok(())
}

#[tokio::test]
async fn current_run_shows_counts_of_finished_step() -> TestResult {
    init_tracing();

    let summary = DeletionSummary {
        attempted: 5,
        succeeded: 3,
        failed: 2,
        failures: (0..2)
            .map(|i| DeletionFailure {
                path: PathBuf::from(format!("/cache/locked-{i}")),
                reason: "in use".to_string(),
            })
            .collect(),
    };
    let registry = registry_of([ActionBuilder::new("purge").bulk_delete("/cache").build()]);
    let backend = FakeBackend::new().with_deletion_summary(summary);
    // A single slot keeps the run parked on its final banner until we read.
    let (coordinator, mut rx) = TaskCoordinator::with_channel(registry, backend, 1);

    coordinator.submit("purge")?;

    with_timeout(async {
        while let Some(event) = rx.recv().await {
            if matches!(&event, TaskEvent::Output { text, .. } if text.contains("locked-1")) {
                break;
            }
        }
    })
    .await;

    let run = with_timeout(async {
        loop {
            if let Some(run) = coordinator.current_run() {
                if run.deleted == 3 {
                    break run;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert_eq!((run.deleted, run.failed, run.errors), (3, 2, 0));

    collect_until_completed(&mut rx).await;
    assert!(coordinator.current_run().is_none());

    Ok(())
}

#[tokio::test]
async fn panicking_run_still_delivers_completed_on_full_channel() -> TestResult {
    init_tracing();

    let registry = registry_of([ActionBuilder::new("crash")
        .run("boom", &[])
        .fixed("never", &[])
        .build()]);
    let backend = FakeBackend::new().with_panic("boom");
    let probe = backend.clone();
    // The announcement line fills the only slot before the panic.
    let (coordinator, mut rx) = TaskCoordinator::with_channel(registry, backend, 1);

    coordinator.submit("crash")?;
    let events = collect_until_completed(&mut rx).await;

    assert_eq!(
        events,
        vec![TaskEvent::output("Starting: boom"), TaskEvent::Completed]
    );
    assert!(!coordinator.is_running());
    assert_eq!(probe.call_labels(), vec!["boom"]);

    Ok(())
}
