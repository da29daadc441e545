// src/registry/action.rs

use std::fmt;

use serde::Deserialize;

use crate::types::ProgressKind;

/// One unit of work inside an [`Action`].
///
/// `path` and `program` fields may contain placeholders such as `{temp}`
/// (see [`crate::registry::paths`]); `args` are always passed literally.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Step {
    /// Run a program, streaming its merged output line by line.
    RunCommand {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        progress: Option<ProgressKind>,
    },
    /// Remove every immediate child of a directory.
    BulkDelete { path: String },
    /// Remove one file if present; absence is fine.
    RemoveFile { path: String },
    /// Run a fixed OS call whose output is not shown. With `detach` the
    /// program is started and left running.
    FixedCall {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        detach: bool,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::RunCommand {
                program,
                args,
                progress,
            } => {
                write!(f, "run-command: {}", command_line(program, args))?;
                if let Some(kind) = progress {
                    write!(f, " [progress: {kind}]")?;
                }
                Ok(())
            }
            Step::BulkDelete { path } => write!(f, "bulk-delete: {path}"),
            Step::RemoveFile { path } => write!(f, "remove-file: {path}"),
            Step::FixedCall {
                program,
                args,
                detach,
            } => {
                write!(f, "fixed-call: {}", command_line(program, args))?;
                if *detach {
                    f.write_str(" [detached]")?;
                }
                Ok(())
            }
        }
    }
}

/// A named, ordered sequence of steps. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub description: String,
    pub steps: Vec<Step>,
}

impl Action {
    pub fn new(name: impl Into<String>, description: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            steps,
        }
    }
}

/// `program arg1 arg2`, as shown to the operator.
pub fn command_line(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}
