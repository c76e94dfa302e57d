pub mod apply;
pub mod import;
pub mod init;
pub mod status;
pub mod sync;
pub mod unlink;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::detect::DetectedConfig;
use crate::logging::Logger;
use crate::manifest::{Manifest, resolve_sync_root};
use crate::merge::create_default_manifest;
use crate::outcome::{Outcome, Tally};
use crate::platform::{self, EnvVars, Platform};

/// Environment variable that overrides sync root discovery.
pub const ROOT_ENV: &str = "PACT_ROOT";

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform detection, environment capture, and sync root
/// resolution so that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    pub platform: Platform,
    pub home: PathBuf,
    pub env: EnvVars,
    pub root: PathBuf,
}

impl CommandSetup {
    /// Detect the platform, capture the environment, and find the sync root.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory is unknown or the sync root
    /// cannot be resolved.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let platform = Platform::detect();
        let home = platform::home_dir()?;
        let env = EnvVars::capture();
        let root = resolve_root(global, &env, &home)?;
        log.debug(&format!("platform: {}/{}", platform.os.key(), platform.arch.key()));
        log.debug(&format!("sync root: {}", root.display()));
        Ok(Self {
            platform,
            home,
            env,
            root,
        })
    }

    /// Load the manifest from the sync root.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or does not parse.
    pub fn load_manifest(&self, log: &Logger) -> Result<Manifest> {
        log.stage("Loading manifest");
        let manifest = Manifest::load(&self.root)
            .with_context(|| format!("loading manifest from {}", self.root.display()))?;
        log.info(&format!(
            "loaded {} ({} modules)",
            manifest.path().display(),
            manifest.modules().len()
        ));
        Ok(manifest)
    }

    /// Load the manifest, or start an empty one when none exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing manifest does not parse.
    pub fn load_or_empty_manifest(&self, log: &Logger) -> Result<Manifest> {
        if Manifest::exists(&self.root) {
            self.load_manifest(log)
        } else {
            log.debug(&format!("no manifest under {}", self.root.display()));
            Ok(Manifest::new(&self.root))
        }
    }

    /// Account name used to seed a new manifest.
    #[must_use]
    pub fn username(&self) -> String {
        username(&self.env, &self.home)
    }
}

/// Resolve the sync root: `--root`, then `PACT_ROOT`, then discovery from
/// the current directory with `~/.pact` as fallback.
///
/// # Errors
///
/// Returns an error if discovery fails.
pub fn resolve_root(global: &GlobalOpts, env: &EnvVars, home: &Path) -> Result<PathBuf> {
    let explicit = global
        .root
        .clone()
        .or_else(|| env.get(ROOT_ENV).map(PathBuf::from));
    Ok(resolve_sync_root(explicit.as_deref(), Some(home))?)
}

/// Account name from `USER`/`USERNAME`, else the home directory's name.
#[must_use]
pub fn username(env: &EnvVars, home: &Path) -> String {
    env.get("USER")
        .or_else(|| env.get("USERNAME"))
        .map(str::to_string)
        .or_else(|| home.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "user".to_string())
}

/// Synthesise a manifest from `detected` and write it under `root`.
///
/// # Errors
///
/// Returns an error if the manifest cannot be written.
pub fn write_new_manifest(
    detected: &DetectedConfig,
    username: &str,
    root: &Path,
    log: &Logger,
) -> Result<Manifest> {
    log.stage("Creating manifest");
    let manifest = create_default_manifest(detected, username, root);
    manifest
        .save()
        .with_context(|| format!("writing manifest under {}", root.display()))?;
    log.info(&format!(
        "created {} with {} modules",
        manifest.path().display(),
        manifest.modules().len()
    ));
    Ok(manifest)
}

/// Report every outcome, print the summary, and bail if any action failed.
///
/// With `--json` the outcomes are printed as one JSON array instead of log
/// lines.
///
/// # Errors
///
/// Returns an error if one or more outcomes failed.
pub fn report_outcomes(outcomes: &[Outcome], global: &GlobalOpts, log: &Logger) -> Result<()> {
    let failed = if global.json {
        println!("{}", serde_json::to_string_pretty(outcomes)?);
        Tally::of(outcomes).failed
    } else {
        for outcome in outcomes {
            log.record(outcome);
        }
        log.print_summary();
        log.tally().failed
    };

    if failed > 0 {
        anyhow::bail!("{failed} action(s) failed");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use crate::outcome::Category;

    #[test]
    fn resolve_root_prefers_flag_over_env() {
        let flag = tempfile::tempdir().unwrap();
        let env_root = tempfile::tempdir().unwrap();
        let env = EnvVars::default().with(ROOT_ENV, &env_root.path().to_string_lossy());
        let global = GlobalOpts {
            root: Some(flag.path().to_path_buf()),
            json: false,
        };
        let root = resolve_root(&global, &env, Path::new("/home/u")).unwrap();
        assert_eq!(root, dunce::canonicalize(flag.path()).unwrap());
    }

    #[test]
    fn resolve_root_uses_env_override() {
        let env_root = tempfile::tempdir().unwrap();
        let env = EnvVars::default().with(ROOT_ENV, &env_root.path().to_string_lossy());
        let root = resolve_root(&GlobalOpts::default(), &env, Path::new("/home/u")).unwrap();
        assert_eq!(root, dunce::canonicalize(env_root.path()).unwrap());
    }

    #[test]
    fn username_falls_back_to_home_name() {
        let env = EnvVars::default();
        assert_eq!(username(&env, Path::new("/home/alice")), "alice");
        let env = env.with("USERNAME", "bob");
        assert_eq!(username(&env, Path::new("/home/alice")), "bob");
        let env = env.with("USER", "carol");
        assert_eq!(username(&env, Path::new("/home/alice")), "carol");
    }

    #[test]
    fn report_outcomes_bails_on_failure() {
        let (log, _tmp, _guard) = isolated_logger();
        let outcomes = vec![
            Outcome::ok(Category::File, "shell", ".zshrc", "symlinked"),
            Outcome::fail(Category::Install, "cli", "jq", "exit status 100"),
        ];
        let err = report_outcomes(&outcomes, &GlobalOpts::default(), &log).unwrap_err();
        assert_eq!(err.to_string(), "1 action(s) failed");
        assert_eq!(log.outcomes().len(), 2);
    }

    #[test]
    fn report_outcomes_passes_when_all_succeed_or_skip() {
        let (log, _tmp, _guard) = isolated_logger();
        let outcomes = vec![
            Outcome::ok(Category::File, "shell", ".zshrc", "symlinked"),
            Outcome::skip(Category::Install, "cli", "jq", "already installed"),
        ];
        report_outcomes(&outcomes, &GlobalOpts::default(), &log).unwrap();
        assert_eq!(log.tally().skipped, 1);
    }

    #[test]
    fn write_new_manifest_creates_root_and_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(".pact");
        let manifest =
            write_new_manifest(&DetectedConfig::default(), "jane", &root, &log).unwrap();
        assert!(Manifest::exists(&root));
        assert_eq!(manifest.get_str("name"), "jane");
        assert_eq!(Manifest::load(&root).unwrap().get_str("version"), "1.0.0");
    }

    #[test]
    fn load_or_empty_manifest_without_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let root = tempfile::tempdir().unwrap();
        let setup = CommandSetup {
            platform: Platform::detect(),
            home: root.path().to_path_buf(),
            env: EnvVars::default(),
            root: root.path().join(".pact"),
        };
        let manifest = setup.load_or_empty_manifest(&log).unwrap();
        assert!(manifest.document().is_empty());
        assert!(setup.load_manifest(&log).is_err());
    }
}
