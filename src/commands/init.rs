//! Init command implementation.
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::detect::{ScanOptions, Scanner};
use crate::exec::SystemExecutor;
use crate::logging::Logger;
use crate::manifest::root::SYNC_DIR;
use crate::manifest::{MANIFEST_FILE, Manifest};
use crate::platform::{self, EnvVars, Platform};

/// Run the init command: create `.pact/` in the current directory (or at
/// `--root`) holding a manifest synthesised from a full scan.
///
/// # Errors
///
/// Returns an error if a manifest already exists there or cannot be written.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let root = match &global.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()
            .context("reading current directory")?
            .join(SYNC_DIR),
    };
    init_at(root, log)
}

fn init_at(root: PathBuf, log: &Logger) -> Result<()> {
    if Manifest::exists(&root) {
        anyhow::bail!("already initialised: {}", root.join(MANIFEST_FILE).display());
    }

    let platform = Platform::detect();
    let home = platform::home_dir()?;
    let env = EnvVars::capture();
    let executor = SystemExecutor;

    log.stage("Scanning machine");
    let detected = Scanner::new(platform, &home, &env, &executor).scan(&ScanOptions::all(), &[]);
    super::write_new_manifest(&detected, &super::username(&env, &home), &root, log)?;
    log.info("run `pact import --all` to copy config files into the sync root");
    Ok(())
}
