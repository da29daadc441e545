// src/registry/mod.rs

//! Action registry: named, ordered step sequences.
//!
//! - [`action`] defines [`Action`] and the closed [`Step`] variant type.
//! - [`builtin`] holds the compiled-in action table.
//! - [`paths`] expands `{placeholder}` templates in paths and programs.
//!
//! The registry is built once at startup and shared read-only afterwards.

pub mod action;
pub mod builtin;
pub mod paths;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::ConfigFile;

pub use action::{command_line, Action, Step};
pub use paths::PathError;

#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, Arc<Action>>,
}

impl ActionRegistry {
    /// Empty registry; mostly useful in tests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the compiled-in actions.
    pub fn builtin() -> Self {
        Self::from_actions(builtin::builtin_actions())
    }

    pub fn from_actions(actions: impl IntoIterator<Item = Action>) -> Self {
        let mut registry = Self::new();
        for action in actions {
            registry.insert(action);
        }
        registry
    }

    /// Add or replace actions defined in a config file.
    pub fn with_config(mut self, cfg: &ConfigFile) -> Self {
        for action in cfg.actions() {
            if self.actions.contains_key(&action.name) {
                debug!(action = %action.name, "config replaces built-in action");
            }
            self.insert(action);
        }
        self
    }

    pub fn insert(&mut self, action: Action) {
        self.actions.insert(action.name.clone(), Arc::new(action));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Action>> {
        self.actions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.values().map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_core_actions() {
        let registry = ActionRegistry::builtin();
        for name in [
            "system-file-check",
            "restore-health",
            "disk-scan",
            "defrag",
            "clear-temp",
            "clear-update-cache",
            "reset-icon-cache",
            "set-safe-boot",
            "clear-safe-boot",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn insert_replaces_by_name() {
        let mut registry = ActionRegistry::builtin();
        let before = registry.len();
        registry.insert(Action::new("defrag", "noop", Vec::new()));

        assert_eq!(registry.len(), before);
        let defrag = registry.get("defrag").unwrap();
        assert!(defrag.steps.is_empty());
        assert_eq!(defrag.description, "noop");
    }
}
