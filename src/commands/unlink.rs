//! Unlink command implementation.
use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::sync;

/// Run the unlink command: remove every symlink that sync created.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or a link could not be
/// removed.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let manifest = setup.load_manifest(log)?;

    log.stage("Removing symlinks");
    let outcomes = sync::remove_all_symlinks(&manifest, setup.platform.os, &setup.home);
    super::report_outcomes(&outcomes, global, log)
}
