//! The manifest: a loosely structured JSON document describing the desired
//! developer environment.
//!
//! Any JSON object is a valid manifest. Top-level keys other than `name`,
//! `version` and `secrets` are *modules*; values are read through dot-path
//! accessors that return nothing rather than failing when a key is missing
//! or has an unexpected shape.
//!
//! ```
//! use pact_cli::manifest::Manifest;
//! use serde_json::json;
//!
//! let m = Manifest::from_value(
//!     "/tmp/.pact",
//!     json!({ "name": "ada", "cli": { "tools": ["git", 3, "jq"] } }),
//! )
//! .unwrap();
//! assert_eq!(m.get_string_slice("cli.tools"), vec!["git", "jq"]);
//! assert_eq!(m.modules(), vec!["cli"]);
//! ```
pub mod items;
pub mod paths;
pub mod root;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::ManifestError;

pub use items::{ModuleInfo, SyncItem};
pub use paths::{expand_path, resolve_target};
pub use root::{MANIFEST_FILE, find_sync_root, resolve_sync_root};

/// Top-level keys that are never modules.
const RESERVED_KEYS: [&str; 3] = ["name", "version", "secrets"];

/// A parsed manifest together with the sync root it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    root: PathBuf,
    doc: Map<String, Value>,
}

impl Manifest {
    /// An empty manifest rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            doc: Map::new(),
        }
    }

    /// Wrap an already-parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::NotAnObject`] unless `value` is a JSON object.
    pub fn from_value(root: impl Into<PathBuf>, value: Value) -> Result<Self, ManifestError> {
        match value {
            Value::Object(doc) => Ok(Self {
                root: root.into(),
                doc,
            }),
            _ => Err(ManifestError::NotAnObject),
        }
    }

    /// Read `<root>/pact.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, not JSON, or not
    /// a JSON object at the top level.
    pub fn load(root: &Path) -> Result<Self, ManifestError> {
        let path = root.join(MANIFEST_FILE);
        let text = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ManifestError::NotFound { path: path.clone() }
            } else {
                ManifestError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|e| ManifestError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!("loaded manifest from {}", path.display());
        Self::from_value(root, value)
    }

    /// Whether `<root>/pact.json` exists.
    #[must_use]
    pub fn exists(root: &Path) -> bool {
        root.join(MANIFEST_FILE).is_file()
    }

    /// Write the document to `<root>/pact.json` with 2-space indentation and
    /// a trailing newline, creating the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self) -> Result<(), ManifestError> {
        let path = self.path();
        fs::create_dir_all(&self.root).map_err(|source| ManifestError::Io {
            path: self.root.clone(),
            source,
        })?;
        let mut text = serde_json::to_string_pretty(&self.doc).map_err(|e| ManifestError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        text.push('\n');
        fs::write(&path, text).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("wrote manifest to {}", path.display());
        Ok(())
    }

    /// Sync root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of `pact.json`.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// The raw document.
    #[must_use]
    pub const fn document(&self) -> &Map<String, Value> {
        &self.doc
    }

    /// The raw document, mutably.
    pub const fn document_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.doc
    }

    /// Look up a dot-separated path such as `shell.prompt.tool`.
    ///
    /// Returns `None` when any segment is missing or a non-final segment is
    /// not an object.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.doc.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// String at `path`, or `""` if absent or not a string.
    #[must_use]
    pub fn get_str(&self, path: &str) -> &str {
        self.get(path).and_then(Value::as_str).unwrap_or_default()
    }

    /// Boolean at `path`; anything but `true` reads as `false`.
    #[must_use]
    pub fn get_bool(&self, path: &str) -> bool {
        self.get(path).and_then(Value::as_bool).unwrap_or(false)
    }

    /// The string elements of the list at `path`. Non-string elements are
    /// skipped; a missing or non-list value yields an empty list.
    #[must_use]
    pub fn get_string_slice(&self, path: &str) -> Vec<String> {
        self.get(path)
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The object at `path`, if any.
    #[must_use]
    pub fn get_map(&self, path: &str) -> Option<&Map<String, Value>> {
        self.get(path).and_then(Value::as_object)
    }

    /// Whether `path` resolves to a non-null value.
    #[must_use]
    pub fn has_key(&self, path: &str) -> bool {
        self.get(path).is_some_and(|v| !v.is_null())
    }

    /// All top-level keys, in document order.
    #[must_use]
    pub fn top_level_keys(&self) -> Vec<&str> {
        self.doc.keys().map(String::as_str).collect()
    }

    /// Top-level keys holding objects, excluding `name`, `version` and `secrets`.
    #[must_use]
    pub fn modules(&self) -> Vec<&str> {
        self.doc
            .iter()
            .filter(|(k, v)| !RESERVED_KEYS.contains(&k.as_str()) && v.is_object())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Secret names listed under `secrets`.
    #[must_use]
    pub fn secrets(&self) -> Vec<String> {
        self.get_string_slice("secrets")
    }
}
