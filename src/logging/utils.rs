//! Utility functions for path resolution, ANSI stripping, and time formatting.
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

/// CSI sequences (`ESC [` params, final byte `@`..`~`) and two-byte escapes.
static ANSI_ESCAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\x1b(?:\[[0-?]*[ -/]*[@-~]|[@-Z\\-_])").ok());

/// Strip ANSI escape sequences so log files stay plain text.
pub(super) fn strip_ansi(s: &str) -> String {
    ANSI_ESCAPE
        .as_ref()
        .map_or_else(|| s.to_string(), |re| re.replace_all(s, "").into_owned())
}

/// Return the `$XDG_CACHE_HOME/pact/` directory, creating it if needed.
pub(super) fn pact_cache_dir() -> Option<PathBuf> {
    let cache_dir = std::env::var("XDG_CACHE_HOME").map_or_else(
        |_| {
            std::env::var("HOME")
                .or_else(|_| std::env::var("USERPROFILE"))
                .map_or_else(|_| PathBuf::from("."), PathBuf::from)
                .join(".cache")
        },
        PathBuf::from,
    );
    let dir = cache_dir.join("pact");
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Return the log file path under `$XDG_CACHE_HOME/pact/` (or `~/.cache/pact/`).
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    Some(pact_cache_dir()?.join(format!("{command}.log")))
}

/// Format the current UTC time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_utc_datetime() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format the current UTC time as `HH:MM:SS`.
pub(super) fn format_utc_time() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}
