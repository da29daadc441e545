// src/exec/backend.rs

//! Pluggable step backend abstraction.
//!
//! The coordinator talks to a `StepBackend` instead of spawning processes or
//! touching the filesystem itself. Production uses [`RealStepBackend`];
//! tests provide a fake that records which steps ran and scripts their
//! outcomes.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;

use crate::engine::TaskEvent;
use crate::exec::process::{run_fixed, run_streaming, ExitReport, LaunchError};
use crate::fs::{delete_all, remove_if_exists, DeletionSummary, FileRemoval, FileSystem, RealFileSystem};
use crate::registry::paths::host_placeholder;
use crate::types::ProgressKind;

/// Boxed future returned by backend methods.
pub type StepFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait abstracting how individual steps touch the OS.
pub trait StepBackend: Send + Sync + 'static {
    /// Run a command, streaming output/progress events into `events`.
    fn run_command<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
        progress: Option<ProgressKind>,
        events: &'a mpsc::Sender<TaskEvent>,
    ) -> StepFuture<'a, Result<ExitReport, LaunchError>>;

    /// Run a fixed call; `Ok(None)` when `detach` is set.
    fn fixed_call<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
        detach: bool,
    ) -> StepFuture<'a, Result<Option<ExitReport>, LaunchError>>;

    fn bulk_delete<'a>(&'a self, dir: &'a Path) -> StepFuture<'a, anyhow::Result<DeletionSummary>>;

    fn remove_file<'a>(&'a self, path: &'a Path) -> StepFuture<'a, anyhow::Result<FileRemoval>>;

    /// Value of a `{placeholder}` on this host.
    fn placeholder(&self, name: &str) -> Option<PathBuf> {
        host_placeholder(name)
    }
}

/// Real backend used in production: `tokio::process` plus a [`FileSystem`].
///
/// Filesystem work runs on the blocking pool so a large cache purge never
/// stalls the async workers.
#[derive(Debug, Clone)]
pub struct RealStepBackend {
    fs: Arc<dyn FileSystem>,
}

impl RealStepBackend {
    pub fn new() -> Self {
        Self::with_fs(Arc::new(RealFileSystem))
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl Default for RealStepBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StepBackend for RealStepBackend {
    fn run_command<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
        progress: Option<ProgressKind>,
        events: &'a mpsc::Sender<TaskEvent>,
    ) -> StepFuture<'a, Result<ExitReport, LaunchError>> {
        Box::pin(run_streaming(program, args, progress, events))
    }

    fn fixed_call<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
        detach: bool,
    ) -> StepFuture<'a, Result<Option<ExitReport>, LaunchError>> {
        Box::pin(run_fixed(program, args, detach))
    }

    fn bulk_delete<'a>(&'a self, dir: &'a Path) -> StepFuture<'a, anyhow::Result<DeletionSummary>> {
        let fs = Arc::clone(&self.fs);
        let dir = dir.to_path_buf();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || delete_all(fs.as_ref(), &dir))
                .await
                .map_err(|e| anyhow!("bulk delete worker failed: {e}"))?
        })
    }

    fn remove_file<'a>(&'a self, path: &'a Path) -> StepFuture<'a, anyhow::Result<FileRemoval>> {
        let fs = Arc::clone(&self.fs);
        let path = path.to_path_buf();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || remove_if_exists(fs.as_ref(), &path))
                .await
                .map_err(|e| anyhow!("remove worker failed: {e}"))?
        })
    }
}
