// src/engine/coordinator.rs

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use crate::errors::{MaintError, Result};
use crate::exec::StepBackend;
use crate::registry::ActionRegistry;

use super::run::{drive, TaskRun};
use super::{RejectReason, SubmitOutcome, TaskEvent};

/// Shared state between the coordinator and its background run.
///
/// `running` is true exactly while `active` holds a run.
#[derive(Debug, Default)]
pub(crate) struct Gate {
    running: AtomicBool,
    active: Mutex<Option<TaskRun>>,
}

impl Gate {
    fn try_acquire(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn active(&self) -> MutexGuard<'_, Option<TaskRun>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the snapshot of the in-flight run.
    pub(crate) fn publish(&self, run: &TaskRun) {
        *self.active() = Some(run.clone());
    }

    fn release(&self) {
        self.active().take();
        self.running.store(false, Ordering::Release);
    }
}

/// Clears the gate when the run ends, including by panic.
pub(crate) struct RunGuard {
    gate: Arc<Gate>,
    events: mpsc::Sender<TaskEvent>,
    released: bool,
}

impl RunGuard {
    /// Open the gate, then announce completion.
    pub(crate) async fn complete(mut self) {
        self.gate.release();
        self.released = true;
        let _ = self.events.send(TaskEvent::Completed).await;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        warn!("run ended abnormally; releasing gate");
        self.gate.release();

        match self.events.try_send(TaskEvent::Completed) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                // The receiver is behind; deliver once it catches up.
                let events = self.events.clone();
                match Handle::try_current() {
                    Ok(handle) => {
                        handle.spawn(async move {
                            let _ = events.send(event).await;
                        });
                    }
                    Err(_) => error!("event channel full outside a runtime; Completed lost"),
                }
            }
            Err(TrySendError::Closed(_)) => debug!("event receiver gone; Completed dropped"),
        }
    }
}

/// Accepts one action at a time and runs it in the background.
///
/// There is no queue: a submit while a run is active is rejected
/// immediately. Events for the active run are delivered, in order, on the
/// channel given at construction.
pub struct TaskCoordinator<B: StepBackend> {
    registry: Arc<ActionRegistry>,
    backend: Arc<B>,
    events: mpsc::Sender<TaskEvent>,
    gate: Arc<Gate>,
}

impl<B: StepBackend> fmt::Debug for TaskCoordinator<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskCoordinator")
            .field("actions", &self.registry.len())
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl<B: StepBackend> TaskCoordinator<B> {
    pub fn new(registry: ActionRegistry, backend: B, events: mpsc::Sender<TaskEvent>) -> Self {
        Self {
            registry: Arc::new(registry),
            backend: Arc::new(backend),
            events,
            gate: Arc::new(Gate::default()),
        }
    }

    /// Build a coordinator together with the receiving end of its event
    /// channel.
    pub fn with_channel(
        registry: ActionRegistry,
        backend: B,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<TaskEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(registry, backend, tx), rx)
    }

    /// Try to start `action`.
    ///
    /// Never blocks. Must be called from within a Tokio runtime, which hosts
    /// the background run. An unknown action name is a configuration error
    /// and leaves the gate untouched.
    pub fn submit(&self, action: &str) -> Result<SubmitOutcome> {
        let action = self
            .registry
            .get(action)
            .ok_or_else(|| MaintError::UnknownAction(action.to_string()))?;

        if !self.gate.try_acquire() {
            debug!(action = %action.name, "rejecting submit; a run is already active");
            return Ok(SubmitOutcome::Rejected(RejectReason::Busy));
        }

        let run = TaskRun::new(&action);
        self.gate.publish(&run);
        info!(action = %action.name, steps = action.steps.len(), "run accepted");

        let guard = RunGuard {
            gate: Arc::clone(&self.gate),
            events: self.events.clone(),
            released: false,
        };
        let gate = Arc::clone(&self.gate);
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();

        tokio::spawn(async move {
            drive(run, &action, backend.as_ref(), &events, &gate).await;
            guard.complete().await;
        });

        Ok(SubmitOutcome::Accepted)
    }

    pub fn is_running(&self) -> bool {
        self.gate.running.load(Ordering::Acquire)
    }

    /// Snapshot of the active run, if any.
    pub fn current_run(&self) -> Option<TaskRun> {
        self.gate.active().clone()
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }
}
