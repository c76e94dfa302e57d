//! Sync command implementation.
use anyhow::Result;

use crate::cli::{GlobalOpts, SyncOpts};
use crate::logging::Logger;
use crate::sync;

/// Run the sync command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, the requested module
/// has no files for this OS, or any file failed to sync.
pub fn run(global: &GlobalOpts, opts: &SyncOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let manifest = setup.load_manifest(log)?;
    let os = setup.platform.os;

    let outcomes = if let Some(module) = opts.module.as_deref() {
        log.stage(&format!("Syncing {module}"));
        sync::sync_module(&manifest, module, os, &setup.home)?
    } else {
        log.stage("Syncing files");
        for info in manifest.module_infos(os, &setup.home) {
            log.debug(&format!(
                "{}: {} entries, {} files",
                info.name,
                info.file_count,
                manifest.count_module_files(&info.name, os, &setup.home)
            ));
        }
        sync::sync_all(&manifest, os, &setup.home)
    };
    super::report_outcomes(&outcomes, global, log)
}
