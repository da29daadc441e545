// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::registry::{Action, Step};

/// Action table as read from a TOML file, before validation.
///
/// ```toml
/// [action.clear-temp]
/// description = "Delete everything under the temp directory"
///
/// [[action.clear-temp.steps]]
/// kind = "bulk-delete"
/// path = "{temp}"
///
/// [[action.system-file-check.steps]]
/// kind = "run-command"
/// program = "sfc"
/// args = ["/scannow"]
/// progress = "verify-style"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// All actions from `[action.<name>]`, keyed by action name.
    #[serde(default)]
    pub action: BTreeMap<String, ActionConfig>,
}

/// `[action.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ActionConfig {
    /// Shown by `sysmaint list`.
    #[serde(default)]
    pub description: String,

    /// Steps run in declared order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A validated config file. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub action: BTreeMap<String, ActionConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(action: BTreeMap<String, ActionConfig>) -> Self {
        Self { action }
    }

    /// Materialise every configured action.
    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.action.iter().map(|(name, cfg)| {
            Action::new(name.clone(), cfg.description.clone(), cfg.steps.clone())
        })
    }
}
