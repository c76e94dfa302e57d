//! Sync root discovery.
use std::path::{Path, PathBuf};

use crate::error::ManifestError;

/// Name of the sync root directory.
pub const SYNC_DIR: &str = ".pact";

/// Manifest file name inside the sync root.
pub const MANIFEST_FILE: &str = "pact.json";

/// Find the sync root by walking from `start` up to the filesystem root,
/// returning the first `.pact/` directory found. Falls back to
/// `<home>/.pact` when no ancestor has one.
///
/// # Errors
///
/// Returns [`ManifestError::RootNotFound`] if nothing is found and no home
/// directory is known.
pub fn find_sync_root(start: &Path, home: Option<&Path>) -> Result<PathBuf, ManifestError> {
    if let Some(found) = start
        .ancestors()
        .map(|dir| dir.join(SYNC_DIR))
        .find(|candidate| candidate.is_dir())
    {
        tracing::debug!("found sync root {}", found.display());
        return Ok(found);
    }
    home.map(|h| h.join(SYNC_DIR)).ok_or_else(|| {
        ManifestError::RootNotFound(format!(
            "no {SYNC_DIR}/ above {} and no home directory",
            start.display()
        ))
    })
}

/// Resolve the sync root for this invocation.
///
/// An explicit override (from `--root` or `PACT_ROOT`) wins; otherwise the
/// current directory is searched with [`find_sync_root`].
///
/// # Errors
///
/// Returns an error if the current directory cannot be read and no override
/// was given, or if discovery fails.
pub fn resolve_sync_root(
    explicit: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ManifestError> {
    if let Some(root) = explicit {
        return Ok(dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf()));
    }
    let cwd = std::env::current_dir()
        .map_err(|e| ManifestError::RootNotFound(format!("cannot read current directory: {e}")))?;
    find_sync_root(&cwd, home)
}
