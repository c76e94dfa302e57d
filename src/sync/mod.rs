//! Sync engine: materialise manifest file entries as symlinks or copies.
//!
//! Every item is processed independently and in manifest order. A failing
//! item becomes a failed [`Outcome`]; the batch always runs to the end.
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::SyncError;
use crate::manifest::{Manifest, SyncItem};
use crate::outcome::{Category, Outcome};
use crate::platform::Os;
use crate::resources::copy::CopyResource;
use crate::resources::symlink::SymlinkResource;
use crate::resources::{Applicable, Resource, ResourceChange};

/// How a file entry is placed at its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// A symbolic link to the absolute source path.
    Symlink,
    /// A byte-for-byte copy, recursive for directories.
    Copy,
}

impl FromStr for Strategy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "symlink" => Ok(Self::Symlink),
            "copy" => Ok(Self::Copy),
            other => Err(SyncError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Symlink => "symlink",
            Self::Copy => "copy",
        })
    }
}

/// Place one item at its target.
///
/// The source must exist and the strategy must be known before anything on
/// disk is touched. A target that already matches is left alone and reported
/// as skipped.
#[must_use]
pub fn sync_item(item: &SyncItem) -> Outcome {
    tracing::debug!(
        "sync {}/{}: {} -> {} ({})",
        item.module,
        item.name,
        item.source.display(),
        item.target.display(),
        item.strategy
    );
    match try_sync_item(item) {
        Ok(outcome) => outcome,
        Err(e) => Outcome::fail(Category::File, &item.module, &item.name, format!("{e:#}")),
    }
}

fn try_sync_item(item: &SyncItem) -> anyhow::Result<Outcome> {
    if !item.source.exists() {
        return Err(SyncError::SourceNotFound(item.source.clone()).into());
    }
    let strategy: Strategy = item.strategy.parse()?;
    let source = std::path::absolute(&item.source).map_err(|source| SyncError::Io {
        action: "resolve source",
        path: item.source.clone(),
        source,
    })?;
    let target = item.target.clone();

    let (change, applied, unchanged) = match strategy {
        Strategy::Symlink => (
            SymlinkResource::new(source.clone(), target.clone()).ensure()?,
            format!("symlinked {} -> {}", target.display(), source.display()),
            "already linked",
        ),
        Strategy::Copy => (
            CopyResource::new(source.clone(), target.clone()).ensure()?,
            format!("copied {} -> {}", source.display(), target.display()),
            "already up to date",
        ),
    };
    Ok(match change {
        ResourceChange::Applied => Outcome::ok(Category::File, &item.module, &item.name, applied),
        ResourceChange::AlreadyCorrect => {
            Outcome::skip(Category::File, &item.module, &item.name, unchanged)
        }
        ResourceChange::Skipped { reason } => {
            Outcome::skip(Category::File, &item.module, &item.name, reason)
        }
    })
}

/// Sync every item in the manifest that resolves for `os`.
#[must_use]
pub fn sync_all(manifest: &Manifest, os: Os, home: &Path) -> Vec<Outcome> {
    manifest.sync_items(os, home).iter().map(sync_item).collect()
}

/// Sync the items of one module.
///
/// # Errors
///
/// Returns [`SyncError::ModuleNotFound`] when the module has no file entries
/// for `os`. Per-item failures are reported in the returned outcomes.
pub fn sync_module(
    manifest: &Manifest,
    module: &str,
    os: Os,
    home: &Path,
) -> Result<Vec<Outcome>, SyncError> {
    let items = manifest.sync_items_for_module(module, os, home);
    if items.is_empty() {
        return Err(SyncError::ModuleNotFound(module.to_string()));
    }
    Ok(items.iter().map(sync_item).collect())
}

/// Remove the links created for symlink-strategy items.
///
/// Targets that are absent, or that are real files because they were copied
/// or edited by hand, are reported as skipped and left untouched.
#[must_use]
pub fn remove_all_symlinks(manifest: &Manifest, os: Os, home: &Path) -> Vec<Outcome> {
    manifest
        .sync_items(os, home)
        .iter()
        .filter(|item| item.strategy.parse::<Strategy>().ok() == Some(Strategy::Symlink))
        .map(|item| {
            let resource = SymlinkResource::new(item.source.clone(), item.target.clone());
            match resource.remove() {
                Ok(ResourceChange::Skipped { reason }) => {
                    Outcome::skip(Category::File, &item.module, &item.name, reason)
                }
                Ok(_) => Outcome::ok(
                    Category::File,
                    &item.module,
                    &item.name,
                    format!("removed {}", item.target.display()),
                ),
                Err(e) => Outcome::fail(Category::File, &item.module, &item.name, format!("{e:#}")),
            }
        })
        .collect()
}
