// src/engine/mod.rs

//! Task execution engine.
//!
//! - [`coordinator`] owns the accept/reject gate and spawns one background
//!   run at a time.
//! - [`run`] drives an action's steps in order and turns every step outcome
//!   into [`TaskEvent`]s.
//!
//! Events travel to the caller over a `tokio::sync::mpsc` channel which the
//! caller drains on its own schedule.

use std::fmt;

/// Events flowing from a run to whoever drains the coordinator's channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// One line of output for the operator.
    Output { text: String, is_error: bool },
    /// Completion percentage reported by the running tool.
    Progress(u8),
    /// The run is over and the gate is open again. Sent exactly once per run.
    Completed,
}

impl TaskEvent {
    pub fn output(text: impl Into<String>) -> Self {
        TaskEvent::Output {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        TaskEvent::Output {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Answer to [`TaskCoordinator::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Another run is in progress; try again after it completes.
    Busy,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Busy => f.write_str("busy"),
        }
    }
}

pub mod coordinator;
pub mod run;

pub use coordinator::TaskCoordinator;
pub use run::TaskRun;
