//! Target path resolution.
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::platform::Os;

/// Expand a leading `~` (alone or followed by `/`) to `home`.
///
/// Any other path, including `~user/...`, is returned unchanged.
#[must_use]
pub fn expand_path(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        home.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Resolve a file entry's `target` for `os`.
///
/// A string target applies to every OS. An object target is keyed by OS
/// (`darwin`, `linux`, `windows`); if it has no string for `os`, the entry
/// does not apply here and `None` is returned. Other shapes also yield
/// `None`.
#[must_use]
pub fn resolve_target(target: &Value, os: Os, home: &Path) -> Option<PathBuf> {
    match target {
        Value::String(path) => Some(expand_path(path, home)),
        Value::Object(per_os) => per_os
            .get(os.key())
            .and_then(Value::as_str)
            .map(|path| expand_path(path, home)),
        _ => None,
    }
}
