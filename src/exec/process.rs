// src/exec/process.rs

//! External process execution.
//!
//! [`run_streaming`] runs a command with stdout and stderr merged into one
//! line stream; [`run_fixed`] runs a fixed OS call whose output is only
//! logged, or launches it detached.

use std::process::Stdio;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::TaskEvent;
use crate::exec::progress::extract;
use crate::exec::scanner::{clean_line, LineScanner};
use crate::registry::command_line;
use crate::types::ProgressKind;

/// The program could not be started at all (missing, not executable).
#[derive(Debug, Error)]
#[error("could not start '{program}': {source}")]
pub struct LaunchError {
    pub program: String,
    #[source]
    pub source: std::io::Error,
}

/// How a waited-for process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ExitReport {
    pub fn describe(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "no exit code (terminated by signal)".to_string(),
        }
    }
}

impl From<std::process::ExitStatus> for ExitReport {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

pub(crate) fn base_command(program: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null());

    // Console tools must not flash a window of their own.
    #[cfg(windows)]
    cmd.creation_flags(0x0800_0000);

    cmd
}

/// Run `program`, forwarding each non-blank output line (stdout and stderr
/// merged) as a [`TaskEvent::Output`], plus a [`TaskEvent::Progress`] for
/// every line `progress` recognises. Waits for the process to exit.
pub async fn run_streaming(
    program: &str,
    args: &[String],
    progress: Option<ProgressKind>,
    events: &mpsc::Sender<TaskEvent>,
) -> Result<ExitReport, LaunchError> {
    let mut cmd = base_command(program, args);
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| LaunchError {
        program: program.to_string(),
        source,
    })?;

    info!(cmd = %command_line(program, args), pid = ?child.id(), "process started");

    let (line_tx, mut line_rx) = mpsc::channel::<String>(64);
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(pump_lines(stdout, line_tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(pump_lines(stderr, line_tx.clone()));
    }
    // The loop below ends once both pumps have hung up.
    drop(line_tx);

    while let Some(raw) = line_rx.recv().await {
        let Some(line) = clean_line(&raw) else {
            continue;
        };

        // A vanished receiver only means nobody is listening; keep draining
        // so the child never blocks on a full pipe.
        let _ = events.send(TaskEvent::output(line)).await;

        if let Some(pct) = progress.and_then(|kind| extract(line, kind)) {
            let _ = events.send(TaskEvent::Progress(pct)).await;
        }
    }

    let report = match child.wait().await {
        Ok(status) => ExitReport::from(status),
        Err(e) => {
            warn!(program, error = %e, "failed to wait for process");
            ExitReport {
                success: false,
                code: None,
            }
        }
    };

    info!(program, success = report.success, code = ?report.code, "process exited");
    Ok(report)
}

async fn pump_lines<R>(mut reader: R, tx: mpsc::Sender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut scanner = LineScanner::new();
    let mut buf = [0u8; 4096];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                for line in scanner.push(&buf[..n]) {
                    if tx.send(line).await.is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                debug!(error = %e, "output pipe read failed");
                break;
            }
        }
    }

    if let Some(line) = scanner.finish() {
        let _ = tx.send(line).await;
    }
}

/// Run a fixed OS call.
///
/// - `detach = false`: wait for exit; output goes to the debug log only.
/// - `detach = true`: start the program and return `Ok(None)` immediately,
///   leaving it running.
pub async fn run_fixed(
    program: &str,
    args: &[String],
    detach: bool,
) -> Result<Option<ExitReport>, LaunchError> {
    let mut cmd = base_command(program, args);
    let launch_err = |source| LaunchError {
        program: program.to_string(),
        source,
    };

    if detach {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        let child = cmd.spawn().map_err(launch_err)?;
        info!(cmd = %command_line(program, args), pid = ?child.id(), "launched detached");
        return Ok(None);
    }

    let output = cmd.output().await.map_err(launch_err)?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stdout.lines().chain(stderr.lines()).filter_map(clean_line) {
        debug!(program, "output: {}", line);
    }

    let report = ExitReport::from(output.status);
    info!(program, success = report.success, code = ?report.code, "fixed call finished");
    Ok(Some(report))
}
