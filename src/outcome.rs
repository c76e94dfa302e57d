//! Per-action outcome records and batch tallies.
//!
//! Every engine operation reports what it did as a list of [`Outcome`]s,
//! one per attempted action. A failure of one action is recorded here and
//! never aborts the rest of the batch.
use std::fmt;

use serde::Serialize;

use crate::resources::ResourceChange;

/// Kind of action an [`Outcome`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// A tool or package installation.
    Install,
    /// A configuration change (shell init line, git setting, theme).
    Configure,
    /// A symlinked or copied file.
    File,
    /// A font installation.
    Font,
    /// An editor extension.
    Extension,
    /// A desktop application.
    App,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Install => "install",
            Self::Configure => "configure",
            Self::File => "file",
            Self::Font => "font",
            Self::Extension => "extension",
            Self::App => "app",
        })
    }
}

/// Outcome of one attempted action.
///
/// `skipped` outcomes are always `success`: the desired state already held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// What kind of action this was.
    pub category: Category,
    /// Manifest module the action belongs to.
    pub module: String,
    /// Item name (tool, file, setting key, ...).
    pub name: String,
    /// Whether the desired state holds after the action.
    pub success: bool,
    /// Whether nothing had to be done.
    pub skipped: bool,
    /// Human-readable description of what happened.
    pub message: String,
    /// Failure diagnostic, verbatim from the failing operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    /// A change was made.
    #[must_use]
    pub fn ok(category: Category, module: &str, name: &str, message: impl Into<String>) -> Self {
        Self {
            category,
            module: module.to_string(),
            name: name.to_string(),
            success: true,
            skipped: false,
            message: message.into(),
            error: None,
        }
    }

    /// Nothing had to be done.
    #[must_use]
    pub fn skip(category: Category, module: &str, name: &str, message: impl Into<String>) -> Self {
        Self {
            skipped: true,
            ..Self::ok(category, module, name, message)
        }
    }

    /// The action failed.
    #[must_use]
    pub fn fail(category: Category, module: &str, name: &str, error: impl fmt::Display) -> Self {
        Self {
            category,
            module: module.to_string(),
            name: name.to_string(),
            success: false,
            skipped: false,
            message: String::new(),
            error: Some(error.to_string()),
        }
    }

    /// Fold a resource change into an outcome. `applied` is the message used
    /// when a change was made.
    #[must_use]
    pub fn from_change(
        category: Category,
        module: &str,
        name: &str,
        change: ResourceChange,
        applied: impl Into<String>,
    ) -> Self {
        match change {
            ResourceChange::Applied => Self::ok(category, module, name, applied),
            ResourceChange::AlreadyCorrect => Self::skip(category, module, name, "already correct"),
            ResourceChange::Skipped { reason } => Self::skip(category, module, name, reason),
        }
    }
}

/// Applied/skipped/failed counts over a batch of outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// Actions that changed something.
    pub applied: usize,
    /// Actions that found the desired state already in place.
    pub skipped: usize,
    /// Actions that failed.
    pub failed: usize,
}

impl Tally {
    /// Count a batch.
    #[must_use]
    pub fn of(outcomes: &[Outcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut t, o| {
            t.add(o);
            t
        })
    }

    /// Count one outcome.
    pub const fn add(&mut self, outcome: &Outcome) {
        if !outcome.success {
            self.failed += 1;
        } else if outcome.skipped {
            self.skipped += 1;
        } else {
            self.applied += 1;
        }
    }

    /// Total number of outcomes counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.applied + self.skipped + self.failed
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} applied, {} skipped, {} failed",
            self.applied, self.skipped, self.failed
        )
    }
}
