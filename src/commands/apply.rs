//! Apply command implementation.
use anyhow::Result;

use crate::apply::{self, ApplyContext};
use crate::cli::{ApplyOpts, GlobalOpts};
use crate::exec::SystemExecutor;
use crate::logging::Logger;
use crate::outcome::Outcome;
use crate::resources::download::HttpDownloader;

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or any action failed.
pub fn run(global: &GlobalOpts, opts: &ApplyOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let manifest = setup.load_manifest(log)?;
    let executor = SystemExecutor;
    let downloader = HttpDownloader;
    let ctx = ApplyContext::new(
        &manifest,
        setup.platform,
        &setup.home,
        &setup.env,
        &executor,
        &downloader,
    );
    match ctx.package_manager() {
        Some(pm) => log.debug(&format!("package manager: {}", pm.name())),
        None => log.warn("no supported package manager found; installs will fail"),
    }

    let outcomes = execute(&ctx, opts.module.as_deref(), log);
    super::report_outcomes(&outcomes, global, log)
}

/// Apply one module, or the whole manifest when `module` is `None`.
#[must_use]
pub fn execute(ctx: &ApplyContext<'_>, module: Option<&str>, log: &Logger) -> Vec<Outcome> {
    if let Some(module) = module {
        log.stage(&format!("Applying {module}"));
        if !apply::KNOWN_MODULES.contains(&module) && !ctx.manifest.has_key(module) {
            log.warn(&format!("module '{module}' is not in the manifest"));
        }
        apply::apply_module(ctx, module)
    } else {
        log.stage("Applying manifest");
        apply::apply_all(ctx)
    }
}
