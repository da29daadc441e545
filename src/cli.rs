// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `sysmaint`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sysmaint",
    version,
    about = "Run system repair and cleanup actions one at a time, streaming their progress.",
    long_about = None
)]
pub struct CliArgs {
    /// Optional TOML file that adds or replaces actions.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SYSMAINT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// List every registered action.
    List,
    /// Print one action's steps without running it.
    Show {
        /// Action name, e.g. `clear-temp`.
        action: String,
    },
    /// Run an action and stream its output until it completes.
    Run {
        /// Action name, e.g. `system-file-check`.
        action: String,

        /// Run even when the process lacks administrator rights.
        #[arg(long)]
        allow_unelevated: bool,
    },
    /// Show OS, CPU load, memory use and uptime.
    Info,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_global_flags_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "sysmaint",
            "run",
            "clear-temp",
            "--config",
            "actions.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.config.as_deref(), Some("actions.toml"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(matches!(
            args.command,
            CliCommand::Run { ref action, allow_unelevated: false } if action == "clear-temp"
        ));
    }

    #[test]
    fn parses_info_and_elevation_override() {
        let info = CliArgs::try_parse_from(["sysmaint", "info"]).unwrap();
        assert!(matches!(info.command, CliCommand::Info));

        let run =
            CliArgs::try_parse_from(["sysmaint", "run", "defrag", "--allow-unelevated"]).unwrap();
        assert!(matches!(
            run.command,
            CliCommand::Run { allow_unelevated: true, .. }
        ));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(CliArgs::try_parse_from(["sysmaint"]).is_err());
    }
}
