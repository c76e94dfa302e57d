use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for pact.
#[derive(Parser, Debug)]
#[command(
    name = "pact",
    about = "Declarative developer environment: apply a manifest, import a machine",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Override the sync root directory (also `PACT_ROOT`)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Print results as JSON instead of log lines
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install and configure everything the manifest declares
    Apply(ApplyOpts),
    /// Link or copy manifest files into place
    Sync(SyncOpts),
    /// Remove symlinks created by sync
    Unlink,
    /// Compare this machine against the manifest
    Status(StatusOpts),
    /// Fold what is installed on this machine into the manifest
    Import(ImportOpts),
    /// Create a sync root in the current directory
    Init,
    /// Print version information
    Version,
}

impl Command {
    /// Short name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Apply(_) => "apply",
            Self::Sync(_) => "sync",
            Self::Unlink => "unlink",
            Self::Status(_) => "status",
            Self::Import(_) => "import",
            Self::Init => "init",
            Self::Version => "version",
        }
    }
}

/// Options for the `apply` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct ApplyOpts {
    /// Apply only this module
    pub module: Option<String>,
}

/// Options for the `sync` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct SyncOpts {
    /// Sync only this module's files
    pub module: Option<String>,
}

/// Options for the `status` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct StatusOpts {
    /// Limit the scan to these modules
    #[arg(short, long, value_delimiter = ',')]
    pub module: Vec<String>,
}

/// Options for the `import` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct ImportOpts {
    /// Import only these modules
    #[arg(short, long, value_delimiter = ',')]
    pub module: Vec<String>,

    /// Import every module, including discovered config files
    #[arg(short, long, conflicts_with = "module")]
    pub all: bool,
}
