#![allow(dead_code)]

use std::collections::BTreeMap;

use sysmaint::config::{ActionConfig, ConfigFile, RawConfigFile};
use sysmaint::registry::{Action, ActionRegistry, Step};
use sysmaint::types::ProgressKind;

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// Builder for `Action` to simplify test setup.
pub struct ActionBuilder {
    name: String,
    description: String,
    steps: Vec<Step>,
}

impl ActionBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            steps: Vec::new(),
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    pub fn run(mut self, program: &str, args: &[&str]) -> Self {
        self.steps.push(Step::RunCommand {
            program: program.to_string(),
            args: owned(args),
            progress: None,
        });
        self
    }

    pub fn run_with_progress(mut self, program: &str, args: &[&str], kind: ProgressKind) -> Self {
        self.steps.push(Step::RunCommand {
            program: program.to_string(),
            args: owned(args),
            progress: Some(kind),
        });
        self
    }

    pub fn fixed(mut self, program: &str, args: &[&str]) -> Self {
        self.steps.push(Step::FixedCall {
            program: program.to_string(),
            args: owned(args),
            detach: false,
        });
        self
    }

    pub fn detached(mut self, program: &str, args: &[&str]) -> Self {
        self.steps.push(Step::FixedCall {
            program: program.to_string(),
            args: owned(args),
            detach: true,
        });
        self
    }

    pub fn bulk_delete(mut self, path: &str) -> Self {
        self.steps.push(Step::BulkDelete {
            path: path.to_string(),
        });
        self
    }

    pub fn remove_file(mut self, path: &str) -> Self {
        self.steps.push(Step::RemoveFile {
            path: path.to_string(),
        });
        self
    }

    pub fn build(self) -> Action {
        Action::new(self.name, self.description, self.steps)
    }
}

/// Registry containing exactly the given actions.
pub fn registry_of(actions: impl IntoIterator<Item = Action>) -> ActionRegistry {
    ActionRegistry::from_actions(actions)
}

/// Builder for `ConfigFile`, validated on `build`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                action: BTreeMap::new(),
            },
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.config.action.insert(
            action.name.clone(),
            ActionConfig {
                description: action.description,
                steps: action.steps,
            },
        );
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
