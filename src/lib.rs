// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod host;
pub mod logging;
pub mod registry;
pub mod types;

use anyhow::{bail, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{CliArgs, CliCommand};
use crate::config::load_and_validate;
use crate::engine::{SubmitOutcome, TaskCoordinator, TaskEvent};
use crate::exec::RealStepBackend;
use crate::registry::{Action, ActionRegistry};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the administrator-rights check for `run`
/// - the built-in action table plus an optional config file
/// - the real step backend
/// - the task coordinator and its event channel
pub async fn run(args: CliArgs) -> Result<()> {
    let registry = build_registry(args.config.as_deref())?;

    match args.command {
        CliCommand::List => {
            print_actions(registry.iter());
            Ok(())
        }
        CliCommand::Show { action } => {
            let Some(found) = registry.get(&action) else {
                bail!("unknown action '{action}' (see `sysmaint list`)");
            };
            print_actions(std::iter::once(found.as_ref()));
            Ok(())
        }
        CliCommand::Run {
            action,
            allow_unelevated,
        } => {
            if !registry.contains(&action) {
                bail!("unknown action '{action}' (see `sysmaint list`)");
            }
            let elevation = host::detect().await;
            debug!(%elevation, "checked administrator rights");
            host::admit(elevation, allow_unelevated)?;
            run_action(registry, &action).await
        }
        CliCommand::Info => {
            println!("{}", host::collect().await);
            Ok(())
        }
    }
}

fn build_registry(config: Option<&str>) -> Result<ActionRegistry> {
    let registry = ActionRegistry::builtin();
    let Some(path) = config else {
        return Ok(registry);
    };

    let cfg = load_and_validate(path)?;
    info!(path, actions = cfg.action.len(), "loaded action config");
    Ok(registry.with_config(&cfg))
}

/// Submit one action and render its events to stdout until it completes.
async fn run_action(registry: ActionRegistry, name: &str) -> Result<()> {
    let (coordinator, mut events) =
        TaskCoordinator::with_channel(registry, RealStepBackend::new(), 64);

    match coordinator.submit(name)? {
        SubmitOutcome::Accepted => {}
        SubmitOutcome::Rejected(reason) => bail!("action '{name}' rejected: {reason}"),
    }

    drain_events(&mut events).await;
    debug!(action = name, "event stream finished");
    Ok(())
}

async fn drain_events(events: &mut mpsc::Receiver<TaskEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            TaskEvent::Output { text, is_error } => {
                if is_error {
                    println!("[error] {text}");
                } else {
                    println!("{text}");
                }
            }
            TaskEvent::Progress(pct) => println!("[{pct:>3}%]"),
            TaskEvent::Completed => break,
        }
    }
}

fn print_actions<'a>(actions: impl Iterator<Item = &'a Action>) {
    for action in actions {
        println!("{}", action.name);
        if !action.description.is_empty() {
            println!("    {}", action.description);
        }
        for (i, step) in action.steps.iter().enumerate() {
            println!("    {}. {step}", i + 1);
        }
    }
}
