//! Domain-specific error types for the pact engine.
//!
//! Internal modules return typed errors (e.g., [`ManifestError`],
//! [`SyncError`]) while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! Per-item failures inside a batch are never raised through these types;
//! they are folded into an [`Outcome`](crate::outcome::Outcome) instead.
//!
//! # Error hierarchy
//!
//! ```text
//! PactError
//! ├── Manifest(ManifestError) — sync root discovery, manifest read/parse/write
//! ├── Sync(SyncError)         — symlink/copy materialisation of one item
//! └── Platform(PlatformError) — unsupported OS or package manager
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the pact engine.
#[derive(Error, Debug)]
pub enum PactError {
    /// Manifest-related error (discovery, parsing, I/O).
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// File synchronisation error.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Platform-specific operation error.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Errors that arise from locating, reading, or writing the manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Neither a `.pact/` directory nor a home directory could be found.
    #[error("cannot determine sync root: {0}")]
    RootNotFound(String),

    /// The manifest file does not exist.
    #[error("manifest not found: {}", path.display())]
    NotFound {
        /// Expected location of `pact.json`.
        path: PathBuf,
    },

    /// The manifest is not valid JSON.
    #[error("failed to parse {}: {message}", path.display())]
    Parse {
        /// Path of the manifest that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// The manifest parsed, but its top level is not a JSON object.
    #[error("manifest top level must be an object")]
    NotAnObject,

    /// An I/O error occurred while reading or writing the manifest.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise while materialising a single sync item.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The item's source path does not exist under the sync root.
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The item names a strategy other than `symlink` or `copy`.
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    /// A module sync matched no file entries for this OS.
    #[error("module '{0}' not found or not configured for this OS")]
    ModuleNotFound(String),

    /// A filesystem operation failed.
    #[error("{action} {}: {source}", path.display())]
    Io {
        /// What was being attempted (e.g. "create target directory").
        action: &'static str,
        /// Path the operation targeted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from platform-specific operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The requested operation is not supported on the current platform.
    #[error("operation not supported on {os}")]
    Unsupported {
        /// Platform key (e.g., `"windows"`).
        os: String,
    },

    /// No supported package manager is installed.
    #[error("no supported package manager found for {os}")]
    NoPackageManager {
        /// Platform key (e.g., `"linux"`).
        os: String,
    },
}
