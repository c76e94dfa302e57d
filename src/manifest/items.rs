//! Discovery of file sync items anywhere in the manifest tree.
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use super::Manifest;
use super::paths::resolve_target;
use crate::platform::Os;

/// Module label for a `files` map placed at the top level of the manifest.
pub const ROOT_FILES_MODULE: &str = "files";

/// Strategy used when a file entry does not name one.
pub const DEFAULT_STRATEGY: &str = "symlink";

/// A file entry resolved for the current OS.
///
/// Recomputed on every pass and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncItem {
    /// Top-level module the entry was found under.
    pub module: String,
    /// Key of the entry in its `files` map.
    pub name: String,
    /// Absolute source path inside the sync root.
    pub source: PathBuf,
    /// Absolute target path on this machine.
    pub target: PathBuf,
    /// `symlink`, `copy`, or whatever the manifest says (validated at sync time).
    pub strategy: String,
    /// Whether the source was a directory at discovery time.
    pub is_dir: bool,
}

/// Per-module summary of configured files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    /// Module name.
    pub name: String,
    /// Number of file entries resolved for this OS.
    pub file_count: usize,
    /// Entry names, in manifest order.
    pub items: Vec<String>,
}

impl Manifest {
    /// Every `files` entry in the document that resolves for `os`.
    ///
    /// `files` maps may appear at any depth; each entry is labelled with the
    /// top-level key it was found under. Entries without a string `source`
    /// or without a target for `os` are skipped.
    #[must_use]
    pub fn sync_items(&self, os: Os, home: &Path) -> Vec<SyncItem> {
        let mut items = Vec::new();
        collect_files(self.document(), None, self.root(), os, home, &mut items);
        items
    }

    /// [`sync_items`](Self::sync_items) restricted to one module.
    #[must_use]
    pub fn sync_items_for_module(&self, module: &str, os: Os, home: &Path) -> Vec<SyncItem> {
        self.sync_items(os, home)
            .into_iter()
            .filter(|item| item.module == module)
            .collect()
    }

    /// Modules that have files configured for `os`, in first-seen order.
    #[must_use]
    pub fn module_infos(&self, os: Os, home: &Path) -> Vec<ModuleInfo> {
        let mut infos: Vec<ModuleInfo> = Vec::new();
        for item in self.sync_items(os, home) {
            if let Some(info) = infos.iter_mut().find(|i| i.name == item.module) {
                info.file_count += 1;
                info.items.push(item.name);
            } else {
                infos.push(ModuleInfo {
                    name: item.module,
                    file_count: 1,
                    items: vec![item.name],
                });
            }
        }
        infos
    }

    /// Number of source files behind a module's entries. Directory sources
    /// count every regular file beneath them; missing sources count zero.
    #[must_use]
    pub fn count_module_files(&self, module: &str, os: Os, home: &Path) -> usize {
        self.sync_items_for_module(module, os, home)
            .iter()
            .map(|item| {
                if item.source.is_dir() {
                    count_files_in_dir(&item.source)
                } else {
                    usize::from(item.source.exists())
                }
            })
            .sum()
    }
}

fn collect_files(
    node: &Map<String, Value>,
    module: Option<&str>,
    root: &Path,
    os: Os,
    home: &Path,
    items: &mut Vec<SyncItem>,
) {
    if let Some(Value::Object(files)) = node.get("files") {
        let label = module.unwrap_or(ROOT_FILES_MODULE);
        items.extend(
            files
                .iter()
                .filter_map(|(name, entry)| parse_entry(label, name, entry, root, os, home)),
        );
    }

    for (key, value) in node {
        if key == "files" {
            continue;
        }
        if let Value::Object(child) = value {
            collect_files(child, Some(module.unwrap_or(key)), root, os, home, items);
        }
    }
}

fn parse_entry(
    module: &str,
    name: &str,
    entry: &Value,
    root: &Path,
    os: Os,
    home: &Path,
) -> Option<SyncItem> {
    let entry = entry.as_object()?;
    let source = root.join(entry.get("source")?.as_str()?);
    let Some(target) = entry.get("target").and_then(|t| resolve_target(t, os, home)) else {
        tracing::debug!("{module}/{name}: no target for {os}, skipping");
        return None;
    };
    let strategy = entry
        .get("strategy")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_STRATEGY)
        .to_string();
    let is_dir = source.is_dir();
    Some(SyncItem {
        module: module.to_string(),
        name: name.to_string(),
        source,
        target,
        strategy,
        is_dir,
    })
}

fn count_files_in_dir(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files_in_dir(&path)
            } else {
                1
            }
        })
        .sum()
}
