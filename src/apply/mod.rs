//! Apply engine: install and configure what the manifest describes.
//!
//! Each module has an `apply_*` function returning one [`Outcome`] per
//! attempted action. Nothing here aborts a batch: a failing install or
//! config call becomes a failed outcome and the next action runs.
mod apps;
mod editor;
mod git;
mod llm;
mod shell;
mod terminal;
mod tools;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::exec::Executor;
use crate::manifest::Manifest;
use crate::outcome::{Category, Outcome};
use crate::platform::{EnvVars, Os, Platform};
use crate::resources::download::Downloader;
use crate::resources::package::{PackageManager, PackageResource, detect_package_manager};
use crate::resources::{Resource, ResourceChange};
use crate::sync;

pub use apps::{apply_apps, app_package};
pub use editor::apply_editor;
pub use git::apply_git;
pub use llm::apply_llm;
pub use shell::apply_shell;
pub use terminal::apply_terminal;
pub use tools::{apply_cli_tools, custom_tool_repo};

/// Modules with dedicated apply logic. Any other name syncs that module's
/// files.
pub const KNOWN_MODULES: [&str; 7] = ["cli", "shell", "git", "editor", "terminal", "llm", "apps"];

/// Everything an apply pass needs, resolved once per run.
pub struct ApplyContext<'a> {
    /// The manifest being applied.
    pub manifest: &'a Manifest,
    /// Current OS and architecture.
    pub platform: Platform,
    /// User's home directory.
    pub home: PathBuf,
    /// Environment snapshot (`SHELL`, ...).
    pub env: &'a EnvVars,
    /// Runs external programs.
    pub executor: &'a dyn Executor,
    /// Fetches release metadata and files.
    pub downloader: &'a dyn Downloader,
    /// Where custom tools from GitHub releases are installed.
    pub bin_dir: PathBuf,
    package_manager: Option<Box<dyn PackageManager>>,
}

impl fmt::Debug for ApplyContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplyContext")
            .field("root", &self.manifest.root())
            .field("platform", &self.platform)
            .field("home", &self.home)
            .field("bin_dir", &self.bin_dir)
            .field(
                "package_manager",
                &self.package_manager.as_ref().map(|pm| pm.name()),
            )
            .finish_non_exhaustive()
    }
}

impl<'a> ApplyContext<'a> {
    /// Build a context, resolving the package manager from `PATH`.
    #[must_use]
    pub fn new(
        manifest: &'a Manifest,
        platform: Platform,
        home: &Path,
        env: &'a EnvVars,
        executor: &'a dyn Executor,
        downloader: &'a dyn Downloader,
    ) -> Self {
        let bin_dir = match platform.os {
            Os::Windows => home.join("bin"),
            Os::Darwin | Os::Linux => PathBuf::from("/usr/local/bin"),
        };
        Self {
            manifest,
            platform,
            home: home.to_path_buf(),
            env,
            executor,
            downloader,
            bin_dir,
            package_manager: detect_package_manager(platform.os, executor),
        }
    }

    /// Override the resolved package manager.
    #[must_use]
    pub fn with_package_manager(mut self, package_manager: Option<Box<dyn PackageManager>>) -> Self {
        self.package_manager = package_manager;
        self
    }

    /// Override the install directory for custom tools.
    #[must_use]
    pub fn with_bin_dir(mut self, bin_dir: PathBuf) -> Self {
        self.bin_dir = bin_dir;
        self
    }

    /// The package manager for this run, if one was found.
    #[must_use]
    pub fn package_manager(&self) -> Option<&dyn PackageManager> {
        self.package_manager.as_deref()
    }

    /// Install `package` (providing `binary`) and report it as `name`.
    ///
    /// A binary already on `PATH` is skipped without running anything.
    pub(crate) fn install_package(
        &self,
        module: &str,
        name: &str,
        package: &str,
        binary: &str,
    ) -> Outcome {
        let Some(pm) = self.package_manager() else {
            return Outcome::fail(Category::Install, module, name, "no package manager available");
        };
        tracing::debug!("install {module}/{name} via {}", pm.name());
        match PackageResource::with_binary(package, binary, pm, self.executor).ensure() {
            Ok(ResourceChange::Applied) => Outcome::ok(Category::Install, module, name, "installed"),
            Ok(ResourceChange::AlreadyCorrect) => {
                Outcome::skip(Category::Install, module, name, "already installed")
            }
            Ok(ResourceChange::Skipped { reason }) => {
                Outcome::skip(Category::Install, module, name, reason)
            }
            Err(e) => Outcome::fail(Category::Install, module, name, format!("{e:#}")),
        }
    }
}

/// Apply the whole manifest: cli tools, shell, git, editor, terminal, apps,
/// then every file entry.
#[must_use]
pub fn apply_all(ctx: &ApplyContext<'_>) -> Vec<Outcome> {
    let mut outcomes = apply_cli_tools(ctx);
    outcomes.extend(apply_shell(ctx));
    outcomes.extend(apply_git(ctx));
    outcomes.extend(apply_editor(ctx));
    outcomes.extend(apply_terminal(ctx));
    outcomes.extend(apply_apps(ctx));
    outcomes.extend(apply_files(ctx));
    outcomes
}

/// Apply one module by name. Names without dedicated logic sync the files
/// found under that module, so no module name is rejected.
#[must_use]
pub fn apply_module(ctx: &ApplyContext<'_>, module: &str) -> Vec<Outcome> {
    match module {
        "cli" => apply_cli_tools(ctx),
        "shell" => apply_shell(ctx),
        "git" => apply_git(ctx),
        "editor" => apply_editor(ctx),
        "terminal" => apply_terminal(ctx),
        "llm" => apply_llm(ctx),
        "apps" => apply_apps(ctx),
        other => apply_module_files(ctx, other),
    }
}

/// Sync every file entry in the manifest.
#[must_use]
pub fn apply_files(ctx: &ApplyContext<'_>) -> Vec<Outcome> {
    sync::sync_all(ctx.manifest, ctx.platform.os, &ctx.home)
}

/// Sync the file entries of one module; an unknown module yields nothing.
#[must_use]
pub fn apply_module_files(ctx: &ApplyContext<'_>, module: &str) -> Vec<Outcome> {
    ctx.manifest
        .sync_items_for_module(module, ctx.platform.os, &ctx.home)
        .iter()
        .map(sync::sync_item)
        .collect()
}
