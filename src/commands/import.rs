//! Import command implementation.
use std::path::Path;

use anyhow::Result;

use crate::cli::{GlobalOpts, ImportOpts};
use crate::detect::{DEFAULT_MODULES, DetectedConfig, ScanOptions, Scanner};
use crate::diff;
use crate::exec::SystemExecutor;
use crate::logging::Logger;
use crate::manifest::Manifest;
use crate::merge::{build_selection_from_diffs, merge, select_local_only, validate_selection};
use crate::outcome::{Category, Outcome};

/// Diff module holding discovered config files.
const FILES_MODULE: &str = "files";

/// Run the import command.
///
/// Without a manifest, one is synthesised from a full scan. Otherwise every
/// item found only on this machine in the chosen modules is merged in.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or written, the selection
/// is invalid, or a config file failed to copy.
pub fn run(global: &GlobalOpts, opts: &ImportOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let executor = SystemExecutor;
    let scanner = Scanner::new(setup.platform, &setup.home, &setup.env, &executor);

    if !Manifest::exists(&setup.root) {
        log.stage("Scanning machine");
        let detected = scanner.scan(&ScanOptions::all(), &[]);
        super::write_new_manifest(&detected, &setup.username(), &setup.root, log)?;
        return Ok(());
    }

    let mut manifest = setup.load_manifest(log)?;
    log.stage("Scanning machine");
    let detected = scanner.scan(&scan_options(opts), &manifest.secrets());

    log.stage("Importing");
    let outcomes = import_detected(&detected, &mut manifest, &import_modules(opts), &setup.home)?;
    if outcomes.is_empty() {
        log.info("nothing new to import");
    }
    super::report_outcomes(&outcomes, global, log)
}

/// Modules an import touches: the requested ones, every scanner module by
/// default, and config files too with `--all`.
#[must_use]
pub fn import_modules(opts: &ImportOpts) -> Vec<String> {
    if !opts.all && !opts.module.is_empty() {
        return opts.module.clone();
    }
    let mut modules: Vec<String> = DEFAULT_MODULES.iter().map(|m| (*m).to_string()).collect();
    if opts.all {
        modules.push(FILES_MODULE.to_string());
    }
    modules
}

/// Scanners needed for [`import_modules`]. Config files are only discovered
/// when they will be imported.
#[must_use]
pub fn scan_options(opts: &ImportOpts) -> ScanOptions {
    let modules = import_modules(opts);
    if modules.iter().any(|m| m == FILES_MODULE) {
        ScanOptions::all()
    } else {
        ScanOptions {
            modules,
            include_files: false,
        }
    }
}

/// Merge every local-only item of `modules` into `manifest` and save it.
///
/// Returns one outcome per imported item; config files report their copy.
///
/// # Errors
///
/// Returns an error if the sync root is missing or the manifest cannot be
/// written. A config file that vanished since the scan fails on its own.
pub fn import_detected(
    detected: &DetectedConfig,
    manifest: &mut Manifest,
    modules: &[String],
    home: &Path,
) -> Result<Vec<Outcome>> {
    let diffs = diff::compare(detected, manifest);
    let selected = select_local_only(&diffs, modules);
    let selection = build_selection_from_diffs(&selected, detected);
    if selection.is_empty() {
        return Ok(Vec::new());
    }
    for cf in validate_selection(&selection, manifest.root())? {
        tracing::warn!("{} no longer exists", cf.source_path.display());
    }

    let mut outcomes: Vec<Outcome> = selected
        .iter()
        .filter(|(module, _)| *module != FILES_MODULE)
        .flat_map(|(module, items)| {
            items.iter().map(move |item| {
                Outcome::ok(
                    Category::Configure,
                    module,
                    &item.name,
                    format!("imported {}", item.kind),
                )
            })
        })
        .collect();
    outcomes.extend(merge(&selection, manifest, home)?);
    Ok(outcomes)
}
