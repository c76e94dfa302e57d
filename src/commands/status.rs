//! Status command implementation.
use anyhow::Result;

use crate::cli::{GlobalOpts, StatusOpts};
use crate::detect::{ScanOptions, Scanner};
use crate::diff::{self, DiffItem, DiffResult};
use crate::exec::SystemExecutor;
use crate::logging::Logger;

/// Run the status command: scan the machine and compare it with the
/// manifest. A missing manifest compares against an empty one.
///
/// # Errors
///
/// Returns an error if the sync root cannot be resolved or the manifest does
/// not parse.
pub fn run(global: &GlobalOpts, opts: &StatusOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let manifest = setup.load_or_empty_manifest(log)?;
    let executor = SystemExecutor;

    log.stage("Scanning machine");
    let detected = Scanner::new(setup.platform, &setup.home, &setup.env, &executor)
        .scan(&scan_options(&opts.module), &manifest.secrets());
    let diffs = diff::compare(&detected, &manifest);

    if global.json {
        println!("{}", serde_json::to_string_pretty(&diffs)?);
        return Ok(());
    }

    log.stage("Status");
    for line in render(&diffs) {
        log.info(&line);
    }
    Ok(())
}

/// Scan everything, or only `modules` together with their config files.
#[must_use]
pub fn scan_options(modules: &[String]) -> ScanOptions {
    if modules.is_empty() {
        ScanOptions::all()
    } else {
        ScanOptions {
            modules: modules.to_vec(),
            include_files: true,
        }
    }
}

/// Human-readable status lines: one header per module, `+` for items only
/// on this machine, `-` for items only in the manifest.
#[must_use]
pub fn render(diffs: &[DiffResult]) -> Vec<String> {
    if diffs.is_empty() {
        return vec!["nothing detected and nothing declared".to_string()];
    }

    let mut lines = Vec::new();
    for d in diffs {
        lines.push(format!(
            "{}: {} new, {} missing, {} synced",
            d.module,
            d.local_only.len(),
            d.pact_only.len(),
            d.synced.len()
        ));
        lines.extend(d.local_only.iter().map(|item| format!("  + {}", label(item))));
        lines.extend(d.pact_only.iter().map(|item| format!("  - {}", label(item))));
    }
    lines.push(format!(
        "{} item(s) to import, {} item(s) missing from this machine",
        diff::count_new_items(diffs),
        diff::count_missing_items(diffs)
    ));
    lines
}

fn label(item: &DiffItem) -> String {
    match item.value.as_ref().and_then(serde_json::Value::as_str) {
        Some(value) if !value.is_empty() => format!("{} ({}: {value})", item.name, item.kind),
        _ => format!("{} ({})", item.name, item.kind),
    }
}
