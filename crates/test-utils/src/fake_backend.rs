use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use sysmaint::engine::TaskEvent;
use sysmaint::exec::progress::extract;
use sysmaint::exec::{ExitReport, LaunchError, StepBackend, StepFuture};
use sysmaint::fs::{DeletionSummary, FileRemoval};
use sysmaint::types::ProgressKind;
use tokio::sync::{mpsc, Notify};

/// One backend call, as recorded by [`FakeBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Command { program: String, args: Vec<String> },
    Fixed { program: String, args: Vec<String>, detach: bool },
    BulkDelete(PathBuf),
    RemoveFile(PathBuf),
}

impl Call {
    /// `program arg..` for process calls, the path otherwise.
    pub fn label(&self) -> String {
        match self {
            Call::Command { program, args } | Call::Fixed { program, args, .. } => {
                std::iter::once(program.as_str())
                    .chain(args.iter().map(String::as_str))
                    .collect::<Vec<_>>()
                    .join(" ")
            }
            Call::BulkDelete(path) | Call::RemoveFile(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
enum DeleteScript {
    Summary(DeletionSummary),
    EnumerationError,
}

#[derive(Debug, Clone)]
enum RemoveScript {
    Removed,
    Absent,
    Error,
}

/// A fake backend that:
/// - records every call in order
/// - replays scripted output, exit codes and delete outcomes
/// - can hold `run_command` until the test releases it
#[derive(Debug, Clone)]
pub struct FakeBackend {
    calls: Arc<Mutex<Vec<Call>>>,
    outputs: HashMap<String, Vec<String>>,
    exit_codes: HashMap<String, i32>,
    missing: HashSet<String>,
    panics: HashSet<String>,
    unresolved: HashSet<String>,
    delete: DeleteScript,
    remove: RemoveScript,
    hold: Option<Arc<Notify>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            outputs: HashMap::new(),
            exit_codes: HashMap::new(),
            missing: HashSet::new(),
            panics: HashSet::new(),
            unresolved: HashSet::new(),
            delete: DeleteScript::Summary(DeletionSummary::default()),
            remove: RemoveScript::Removed,
            hold: None,
        }
    }

    /// Lines `program` prints when run as a command.
    pub fn with_output(mut self, program: &str, lines: &[&str]) -> Self {
        self.outputs.insert(
            program.to_string(),
            lines.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_exit_code(mut self, program: &str, code: i32) -> Self {
        self.exit_codes.insert(program.to_string(), code);
        self
    }

    /// `program` fails to launch with `NotFound`.
    pub fn with_missing_program(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    /// Running `program` as a command panics inside the backend.
    pub fn with_panic(mut self, program: &str) -> Self {
        self.panics.insert(program.to_string());
        self
    }

    /// `{name}` cannot be resolved on this fake host.
    pub fn with_unresolved_placeholder(mut self, name: &str) -> Self {
        self.unresolved.insert(name.to_string());
        self
    }

    pub fn with_deletion_summary(mut self, summary: DeletionSummary) -> Self {
        self.delete = DeleteScript::Summary(summary);
        self
    }

    pub fn with_enumeration_error(mut self) -> Self {
        self.delete = DeleteScript::EnumerationError;
        self
    }

    pub fn with_file_absent(mut self) -> Self {
        self.remove = RemoveScript::Absent;
        self
    }

    pub fn with_remove_error(mut self) -> Self {
        self.remove = RemoveScript::Error;
        self
    }

    /// Make every `run_command` wait until the returned handle is notified
    /// (one `notify_one` per command).
    pub fn with_hold(mut self) -> (Self, Arc<Notify>) {
        let notify = Arc::new(Notify::new());
        self.hold = Some(Arc::clone(&notify));
        (self, notify)
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_labels(&self) -> Vec<String> {
        self.calls().iter().map(Call::label).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn launch(&self, program: &str) -> Result<ExitReport, LaunchError> {
        if self.missing.contains(program) {
            return Err(LaunchError {
                program: program.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "program not found"),
            });
        }
        let code = self.exit_codes.get(program).copied().unwrap_or(0);
        Ok(ExitReport {
            success: code == 0,
            code: Some(code),
        })
    }
}

impl StepBackend for FakeBackend {
    fn run_command<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
        progress: Option<ProgressKind>,
        events: &'a mpsc::Sender<TaskEvent>,
    ) -> StepFuture<'a, Result<ExitReport, LaunchError>> {
        Box::pin(async move {
            self.record(Call::Command {
                program: program.to_string(),
                args: args.to_vec(),
            });
            if self.panics.contains(program) {
                panic!("scripted panic in {program}");
            }
            let report = self.launch(program)?;

            for line in self.outputs.get(program).into_iter().flatten() {
                let _ = events.send(TaskEvent::output(line.clone())).await;
                if let Some(pct) = progress.and_then(|kind| extract(line, kind)) {
                    let _ = events.send(TaskEvent::Progress(pct)).await;
                }
            }

            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
            Ok(report)
        })
    }

    fn fixed_call<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
        detach: bool,
    ) -> StepFuture<'a, Result<Option<ExitReport>, LaunchError>> {
        Box::pin(async move {
            self.record(Call::Fixed {
                program: program.to_string(),
                args: args.to_vec(),
                detach,
            });
            let report = self.launch(program)?;
            Ok(if detach { None } else { Some(report) })
        })
    }

    fn bulk_delete<'a>(&'a self, dir: &'a Path) -> StepFuture<'a, anyhow::Result<DeletionSummary>> {
        Box::pin(async move {
            self.record(Call::BulkDelete(dir.to_path_buf()));
            match &self.delete {
                DeleteScript::Summary(summary) => Ok(summary.clone()),
                DeleteScript::EnumerationError => {
                    Err(anyhow!("listing {}: access denied", dir.display()))
                }
            }
        })
    }

    fn remove_file<'a>(&'a self, path: &'a Path) -> StepFuture<'a, anyhow::Result<FileRemoval>> {
        Box::pin(async move {
            self.record(Call::RemoveFile(path.to_path_buf()));
            match self.remove {
                RemoveScript::Removed => Ok(FileRemoval::Removed),
                RemoveScript::Absent => Ok(FileRemoval::Absent),
                RemoveScript::Error => Err(anyhow!("{}: file in use", path.display())),
            }
        })
    }

    fn placeholder(&self, name: &str) -> Option<PathBuf> {
        if self.unresolved.contains(name) {
            None
        } else {
            Some(PathBuf::from(format!("/fake/{name}")))
        }
    }
}
