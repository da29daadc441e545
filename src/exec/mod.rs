// src/exec/mod.rs

//! Process and filesystem execution layer.
//!
//! - [`scanner`] splits raw output bytes into lines.
//! - [`progress`] pulls completion percentages out of those lines.
//! - [`process`] spawns external programs with `tokio::process::Command`,
//!   either streaming their merged output or as fixed/detached calls.
//! - [`backend`] provides the `StepBackend` trait and the concrete
//!   `RealStepBackend` that the coordinator uses in production, and which
//!   tests replace with a fake implementation.

pub mod backend;
pub mod process;
pub mod progress;
pub mod scanner;

pub use backend::{RealStepBackend, StepBackend, StepFuture};
pub use process::{ExitReport, LaunchError};
