//! Shell resource file init-line resource.
use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::PathBuf;

use super::fs::ensure_parent_dir;
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// An init line appended to a shell resource file (`.zshrc`, `.bashrc`,
/// PowerShell profile) under a `# Pact: <marker>` comment.
///
/// The line counts as present when `marker` appears anywhere in the file,
/// so a hand-written init for the same tool is never duplicated.
#[derive(Debug, Clone)]
pub struct ShellInitResource {
    /// Shell resource file.
    pub rc_file: PathBuf,
    /// Tool name searched for, and written in the comment header.
    pub marker: String,
    /// The init line itself.
    pub line: String,
}

impl ShellInitResource {
    /// Create a new init-line resource.
    #[must_use]
    pub fn new(rc_file: PathBuf, marker: &str, line: &str) -> Self {
        Self {
            rc_file,
            marker: marker.to_string(),
            line: line.to_string(),
        }
    }

    /// File name of the resource file, for messages.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.rc_file
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
    }
}

impl Applicable for ShellInitResource {
    fn description(&self) -> String {
        format!("{} in {}", self.marker, self.rc_file.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.rc_file)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.rc_file)
            .with_context(|| format!("opening {}", self.rc_file.display()))?;
        write!(file, "\n# Pact: {}\n{}\n", self.marker, self.line)
            .with_context(|| format!("writing {}", self.rc_file.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ShellInitResource {
    fn current_state(&self) -> Result<ResourceState> {
        // An unreadable or missing file just means the line is not there yet.
        let existing = std::fs::read_to_string(&self.rc_file).unwrap_or_default();
        if existing.contains(&self.marker) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
