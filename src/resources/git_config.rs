//! Global git config entry resource.
use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// A `git config --global` entry.
#[derive(Debug)]
pub struct GitConfigResource<'a> {
    /// Config key (e.g., "user.email").
    pub key: String,
    /// Desired value.
    pub desired_value: String,
    executor: &'a dyn Executor,
}

impl<'a> GitConfigResource<'a> {
    /// Create a new git config resource.
    #[must_use]
    pub fn new(key: &str, desired_value: &str, executor: &'a dyn Executor) -> Self {
        Self {
            key: key.to_string(),
            desired_value: desired_value.to_string(),
            executor,
        }
    }
}

/// Read a global git config value; `None` if unset or git is unavailable.
#[must_use]
pub fn read_global(key: &str, executor: &dyn Executor) -> Option<String> {
    let result = executor
        .run_unchecked("git", &["config", "--global", "--get", key])
        .ok()?;
    let value = result.stdout.trim();
    (result.success && !value.is_empty()).then(|| value.to_string())
}

impl Applicable for GitConfigResource<'_> {
    fn description(&self) -> String {
        format!("{} = {}", self.key, self.desired_value)
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.executor.run(
            "git",
            &["config", "--global", &self.key, &self.desired_value],
        )?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for GitConfigResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(match read_global(&self.key, self.executor) {
            None => ResourceState::Missing,
            Some(current) if current == self.desired_value => ResourceState::Correct,
            Some(current) => ResourceState::Incorrect { current },
        })
    }
}
