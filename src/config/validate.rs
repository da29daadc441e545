// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{MaintError, Result};
use crate::registry::paths::validate_template;
use crate::registry::Step;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::MaintError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.action))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_actions(cfg)?;
    for (name, action) in cfg.action.iter() {
        if name.trim().is_empty() {
            return Err(MaintError::ConfigError(
                "action names must not be empty".to_string(),
            ));
        }
        for (index, step) in action.steps.iter().enumerate() {
            validate_step(name, index, step)?;
        }
    }
    Ok(())
}

fn ensure_has_actions(cfg: &RawConfigFile) -> Result<()> {
    if cfg.action.is_empty() {
        return Err(MaintError::ConfigError(
            "config must contain at least one [action.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_step(action: &str, index: usize, step: &Step) -> Result<()> {
    let step_no = index + 1;
    match step {
        Step::RunCommand { program, .. } | Step::FixedCall { program, .. } => {
            if program.trim().is_empty() {
                return Err(MaintError::ConfigError(format!(
                    "action '{action}' step {step_no}: program must not be empty"
                )));
            }
            check_template(action, step_no, program)
        }
        Step::BulkDelete { path } | Step::RemoveFile { path } => {
            if path.trim().is_empty() {
                return Err(MaintError::ConfigError(format!(
                    "action '{action}' step {step_no}: path must not be empty"
                )));
            }
            check_template(action, step_no, path)
        }
    }
}

fn check_template(action: &str, step_no: usize, template: &str) -> Result<()> {
    validate_template(template).map_err(|e| {
        MaintError::ConfigError(format!("action '{action}' step {step_no}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_str;

    #[test]
    fn accepts_well_formed_table() {
        let raw = parse_str(
            r#"
[action.purge]
description = "purge"

[[action.purge.steps]]
kind = "bulk-delete"
path = "{temp}/cache"

[[action.purge.steps]]
kind = "fixed-call"
program = "net"
args = ["start", "bits"]
"#,
        )
        .unwrap();

        let cfg = ConfigFile::try_from(raw).unwrap();
        let actions: Vec<_> = cfg.actions().collect();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].steps.len(), 2);
    }

    #[test]
    fn rejects_empty_table() {
        let err = ConfigFile::try_from(RawConfigFile::default()).unwrap_err();
        assert!(matches!(err, MaintError::ConfigError(msg) if msg.contains("at least one")));
    }

    #[test]
    fn rejects_unknown_placeholder() {
        let raw = parse_str(
            r#"
[[action.bad.steps]]
kind = "remove-file"
path = "{desktop}/x.db"
"#,
        )
        .unwrap();

        let err = ConfigFile::try_from(raw).unwrap_err();
        match err {
            MaintError::ConfigError(msg) => {
                assert!(msg.contains("'bad' step 1"));
                assert!(msg.contains("desktop"));
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_program() {
        let raw = parse_str(
            r#"
[[action.bad.steps]]
kind = "run-command"
program = "  "
"#,
        )
        .unwrap();

        assert!(ConfigFile::try_from(raw).is_err());
    }
}
