//! Editor extension resource.
use std::collections::HashSet;

use anyhow::{Result, bail};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// The command-line launcher that can install extensions for `editor`, if
/// the editor supports `--install-extension`.
#[must_use]
pub fn extension_cli(editor: &str) -> Option<&'static str> {
    match editor {
        "code" | "vscode" => Some("code"),
        "cursor" => Some("cursor"),
        _ => None,
    }
}

/// An extension installed through the editor's own CLI.
///
/// Installation is forced and idempotent on the editor side; output saying
/// the extension is "already installed" is reported as a skip.
#[derive(Debug)]
pub struct ExtensionResource<'a> {
    /// Editor launcher (`code`, `cursor`).
    pub cli: &'static str,
    /// Extension identifier (e.g. "rust-lang.rust-analyzer").
    pub id: String,
    executor: &'a dyn Executor,
}

impl<'a> ExtensionResource<'a> {
    /// Create a new extension resource.
    #[must_use]
    pub fn new(cli: &'static str, id: &str, executor: &'a dyn Executor) -> Self {
        Self {
            cli,
            id: id.to_string(),
            executor,
        }
    }

    /// Determine the state from a pre-fetched set of installed extension IDs.
    ///
    /// This avoids running `--list-extensions` per resource when used with
    /// [`installed_extensions`].
    #[must_use]
    pub fn state_from_installed(&self, installed: &HashSet<String>) -> ResourceState {
        if installed.contains(&self.id.to_lowercase()) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        }
    }
}

/// Lower-cased IDs of every extension installed for `cli`, from a single
/// `--list-extensions` call. Empty if the editor CLI is unavailable.
#[must_use]
pub fn installed_extensions(cli: &str, executor: &dyn Executor) -> HashSet<String> {
    match executor.run_unchecked(cli, &["--list-extensions"]) {
        Ok(result) if result.success => result
            .stdout
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|id| !id.is_empty())
            .collect(),
        _ => HashSet::new(),
    }
}

impl Applicable for ExtensionResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.id, self.cli)
    }

    fn apply(&self) -> Result<ResourceChange> {
        let result = self
            .executor
            .run_unchecked(self.cli, &["--install-extension", &self.id, "--force"])?;
        if result.success {
            return Ok(ResourceChange::Applied);
        }
        if result.combined_output().contains("already installed") {
            return Ok(ResourceChange::Skipped {
                reason: "already installed".to_string(),
            });
        }
        bail!("{}", result.failure_message())
    }
}

impl Resource for ExtensionResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(self.state_from_installed(&installed_extensions(self.cli, self.executor)))
    }
}
