// src/engine/run.rs

//! Step driver for a single accepted run.
//!
//! Every step outcome becomes output events. Failures inside a step (non-zero
//! exit, launch failure, undeletable items, unreadable directory) never stop
//! the run; only a step that cannot be constructed on this host skips the
//! steps after it.

use std::path::PathBuf;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::exec::StepBackend;
use crate::fs::FileRemoval;
use crate::registry::paths::{expand_with, PathError};
use crate::registry::{command_line, Action, Step};

use super::coordinator::Gate;
use super::TaskEvent;

/// One in-flight execution of an action.
#[derive(Debug, Clone)]
pub struct TaskRun {
    pub action: String,
    /// Zero-based index of the step currently executing.
    pub step_index: usize,
    pub step_count: usize,
    /// Items removed by bulk/single deletes so far.
    pub deleted: usize,
    /// Items that could not be removed so far.
    pub failed: usize,
    /// Error lines emitted so far (non-zero exits, launch failures, ...).
    pub errors: usize,
    pub started_at: Instant,
}

impl TaskRun {
    pub fn new(action: &Action) -> Self {
        Self {
            action: action.name.clone(),
            step_index: 0,
            step_count: action.steps.len(),
            deleted: 0,
            failed: 0,
            errors: 0,
            started_at: Instant::now(),
        }
    }
}

/// A step that cannot be built on this host.
#[derive(Debug)]
struct ConstructionFault(String);

impl From<PathError> for ConstructionFault {
    fn from(e: PathError) -> Self {
        ConstructionFault(e.to_string())
    }
}

struct StepCtx<'a, B: StepBackend + ?Sized> {
    backend: &'a B,
    events: &'a mpsc::Sender<TaskEvent>,
    run: &'a mut TaskRun,
}

impl<B: StepBackend + ?Sized> StepCtx<'_, B> {
    async fn info(&self, text: impl Into<String>) {
        let _ = self.events.send(TaskEvent::output(text)).await;
    }

    async fn error(&mut self, text: impl Into<String>) {
        self.run.errors += 1;
        let _ = self.events.send(TaskEvent::error(text)).await;
    }

    fn expand(&self, template: &str) -> Result<String, ConstructionFault> {
        Ok(expand_with(template, |name| self.backend.placeholder(name))?)
    }

    fn program(&self, template: &str) -> Result<String, ConstructionFault> {
        let program = self.expand(template)?;
        if program.trim().is_empty() {
            return Err(ConstructionFault("program name is empty".to_string()));
        }
        Ok(program)
    }
}

/// Run `action`'s steps in order, publishing progress into `gate` and
/// finishing with a one-line summary. Does not open the gate.
pub(crate) async fn drive<B: StepBackend + ?Sized>(
    mut run: TaskRun,
    action: &Action,
    backend: &B,
    events: &mpsc::Sender<TaskEvent>,
    gate: &Gate,
) {
    for (index, step) in action.steps.iter().enumerate() {
        run.step_index = index;
        gate.publish(&run);
        debug!(action = %action.name, step = index + 1, %step, "executing step");

        let mut ctx = StepCtx {
            backend,
            events,
            run: &mut run,
        };

        let outcome = execute_step(step, &mut ctx).await;
        if let Err(ConstructionFault(reason)) = outcome {
            let skipped = action.steps.len() - index - 1;
            warn!(action = %action.name, step = index + 1, %reason, skipped, "step cannot run");
            ctx.error(format!(
                "Step {} ({step}) cannot run: {reason}; skipping {skipped} remaining step(s)",
                index + 1
            ))
            .await;
            gate.publish(&run);
            break;
        }

        // Counts from this step are visible before the next one starts.
        gate.publish(&run);
    }

    let elapsed = run.started_at.elapsed().as_secs_f64();
    info!(
        action = %action.name,
        elapsed_secs = elapsed,
        deleted = run.deleted,
        failed = run.failed,
        errors = run.errors,
        "run finished"
    );
    let _ = events
        .send(TaskEvent::output(format!(
            "=== {} finished in {:.1}s ({} deleted, {} failed, {} error(s)) ===",
            action.name, elapsed, run.deleted, run.failed, run.errors
        )))
        .await;
}

async fn execute_step<B: StepBackend + ?Sized>(
    step: &Step,
    ctx: &mut StepCtx<'_, B>,
) -> Result<(), ConstructionFault> {
    match step {
        Step::RunCommand {
            program,
            args,
            progress,
        } => {
            let program = ctx.program(program)?;
            ctx.info(format!("Starting: {}", command_line(&program, args)))
                .await;

            match ctx
                .backend
                .run_command(&program, args, *progress, ctx.events)
                .await
            {
                Ok(report) if report.success => {}
                Ok(report) => {
                    ctx.error(format!("{program} exited with {}", report.describe()))
                        .await
                }
                Err(e) => ctx.error(e.to_string()).await,
            }
        }

        Step::FixedCall {
            program,
            args,
            detach,
        } => {
            let program = ctx.program(program)?;
            let verb = if *detach { "Launching" } else { "Running" };
            ctx.info(format!("{verb}: {}", command_line(&program, args)))
                .await;

            match ctx.backend.fixed_call(&program, args, *detach).await {
                Ok(Some(report)) if !report.success => {
                    ctx.error(format!("{program} exited with {}", report.describe()))
                        .await
                }
                Ok(_) => {}
                Err(e) => ctx.error(e.to_string()).await,
            }
        }

        Step::BulkDelete { path } => {
            let dir = PathBuf::from(ctx.expand(path)?);
            ctx.info(format!("Cleaning directory: {}", dir.display()))
                .await;

            match ctx.backend.bulk_delete(&dir).await {
                Ok(summary) => {
                    for failure in &summary.failures {
                        let _ = ctx
                            .events
                            .send(TaskEvent::error(format!(
                                "Failed to delete {}: {}",
                                failure.path.display(),
                                failure.reason
                            )))
                            .await;
                    }
                    ctx.run.deleted += summary.succeeded;
                    ctx.run.failed += summary.failed;

                    let line = format!(
                        "Summary: {} deleted, {} failed",
                        summary.succeeded, summary.failed
                    );
                    if summary.failed > 0 {
                        let _ = ctx.events.send(TaskEvent::error(line)).await;
                    } else {
                        ctx.info(line).await;
                    }
                }
                Err(e) => {
                    ctx.error(format!("Cannot access {}: {e:#}", dir.display()))
                        .await
                }
            }
        }

        Step::RemoveFile { path } => {
            let file = PathBuf::from(ctx.expand(path)?);

            match ctx.backend.remove_file(&file).await {
                Ok(FileRemoval::Removed) => {
                    ctx.run.deleted += 1;
                    ctx.info(format!("Removed {}", file.display())).await;
                }
                Ok(FileRemoval::Absent) => {
                    ctx.info(format!("{} not found (already clean)", file.display()))
                        .await;
                }
                Err(e) => {
                    ctx.run.failed += 1;
                    let _ = ctx
                        .events
                        .send(TaskEvent::error(format!(
                            "Failed to delete {}: {e:#}",
                            file.display()
                        )))
                        .await;
                }
            }
        }
    }

    Ok(())
}
