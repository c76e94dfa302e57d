//! Copied file or directory resource.
use anyhow::Result;
use std::path::PathBuf;

use super::fs::{copy_path, ensure_parent_dir, remove_existing, same_content};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A byte-for-byte copy of `source` at `target`.
///
/// Directories are copied recursively and every file keeps its permission
/// bits. A target whose content already matches the source is left alone.
#[derive(Debug, Clone)]
pub struct CopyResource {
    /// File or directory to copy from.
    pub source: PathBuf,
    /// Destination path.
    pub target: PathBuf,
}

impl CopyResource {
    /// Create a new copy resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for CopyResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.source.display(), self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.target)?;
        remove_existing(&self.target)?;
        copy_path(&self.source, &self.target)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for CopyResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source not found: {}", self.source.display()),
            });
        }
        if self.target.symlink_metadata().is_err() {
            return Ok(ResourceState::Missing);
        }
        if same_content(&self.source, &self.target) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content or permissions differ".to_string(),
            })
        }
    }
}
