//! `git` module: global identity, default branch, and Git LFS.
use anyhow::{Result, bail};

use super::ApplyContext;
use crate::outcome::{Category, Outcome};
use crate::resources::git_config::{GitConfigResource, read_global};
use crate::resources::{Resource, ResourceChange};

const MODULE: &str = "git";

/// Manifest path and the global git key it sets.
const SETTINGS: [(&str, &str); 3] = [
    ("git.user", "user.name"),
    ("git.email", "user.email"),
    ("git.defaultBranch", "init.defaultBranch"),
];

/// Set each configured git value globally and enable LFS when `git.lfs` is
/// true. Values already in place are skipped.
#[must_use]
pub fn apply_git(ctx: &ApplyContext<'_>) -> Vec<Outcome> {
    let mut outcomes: Vec<Outcome> = SETTINGS
        .iter()
        .filter_map(|(path, key)| {
            let value = ctx.manifest.get_str(path);
            (!value.is_empty()).then(|| set_global(ctx, key, value))
        })
        .collect();

    if ctx.manifest.get_bool("git.lfs") {
        outcomes.push(enable_lfs(ctx));
    }
    outcomes
}

fn set_global(ctx: &ApplyContext<'_>, key: &str, value: &str) -> Outcome {
    match GitConfigResource::new(key, value, ctx.executor).ensure() {
        Ok(ResourceChange::Applied) => Outcome::ok(Category::Configure, MODULE, key, value),
        Ok(ResourceChange::AlreadyCorrect) => {
            Outcome::skip(Category::Configure, MODULE, key, "already set")
        }
        Ok(ResourceChange::Skipped { reason }) => {
            Outcome::skip(Category::Configure, MODULE, key, reason)
        }
        Err(e) => Outcome::fail(Category::Configure, MODULE, key, format!("{e:#}")),
    }
}

fn enable_lfs(ctx: &ApplyContext<'_>) -> Outcome {
    // `git lfs install` registers the clean filter; its presence means LFS is set up.
    if read_global("filter.lfs.clean", ctx.executor).is_some() {
        return Outcome::skip(Category::Configure, MODULE, "lfs", "already enabled");
    }
    match lfs_install(ctx) {
        Ok(()) => Outcome::ok(Category::Configure, MODULE, "lfs", "enabled"),
        Err(e) => Outcome::fail(Category::Configure, MODULE, "lfs", format!("{e:#}")),
    }
}

fn lfs_install(ctx: &ApplyContext<'_>) -> Result<()> {
    let first = ctx.executor.run_unchecked("git", &["lfs", "install"])?;
    if first.success {
        return Ok(());
    }
    if ctx.package_manager().is_none() {
        bail!("{}", first.failure_message());
    }
    tracing::debug!("git lfs install failed, installing git-lfs");
    let install = ctx.install_package(MODULE, "git-lfs", "git-lfs", "git-lfs");
    if let Some(err) = install.error {
        bail!("installing git-lfs: {err}");
    }
    let retry = ctx.executor.run_unchecked("git", &["lfs", "install"])?;
    if !retry.success {
        bail!("{}", retry.failure_message());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::apply::test_support::FakeDownloader;
    use crate::manifest::Manifest;
    use crate::platform::{Arch, EnvVars, Os, Platform};
    use crate::resources::package::Brew;
    use crate::resources::test_helpers::MockExecutor;
    use serde_json::json;

    fn darwin() -> Platform {
        Platform::new(Os::Darwin, Arch::Arm64)
    }

    #[test]
    fn sets_missing_values_and_skips_matching_ones() {
        let m = Manifest::from_value(
            "/sync",
            json!({ "git": { "user": "Ada", "email": "ada@example.com", "defaultBranch": "main" } }),
        )
        .unwrap();
        let env = EnvVars::default();
        let exec = MockExecutor::with_responses(vec![
            (true, "Ada\n".to_string()),
            (false, String::new()),
            (true, String::new()),
            (true, "master\n".to_string()),
            (true, String::new()),
        ]);
        let dl = FakeDownloader::default();
        let ctx = ApplyContext::new(&m, darwin(), "/home/ada".as_ref(), &env, &exec, &dl);

        let outcomes = apply_git(&ctx);
        let summary: Vec<_> = outcomes
            .iter()
            .map(|o| (o.name.as_str(), o.skipped, o.message.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("user.name", true, "already set"),
                ("user.email", false, "ada@example.com"),
                ("init.defaultBranch", false, "main"),
            ]
        );
        assert_eq!(
            exec.calls(),
            vec![
                "git config --global --get user.name",
                "git config --global --get user.email",
                "git config --global user.email ada@example.com",
                "git config --global --get init.defaultBranch",
                "git config --global init.defaultBranch main",
            ]
        );
    }

    #[test]
    fn lfs_already_enabled_is_skipped() {
        let m = Manifest::from_value("/sync", json!({ "git": { "lfs": true } })).unwrap();
        let env = EnvVars::default();
        let exec = MockExecutor::ok("git-lfs clean -- %f\n");
        let dl = FakeDownloader::default();
        let ctx = ApplyContext::new(&m, darwin(), "/home/ada".as_ref(), &env, &exec, &dl);

        let outcomes = apply_git(&ctx);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].name, "lfs");
        assert_eq!(outcomes[0].message, "already enabled");
    }

    #[test]
    fn lfs_installs_package_and_retries() {
        let m = Manifest::from_value("/sync", json!({ "git": { "lfs": true } })).unwrap();
        let env = EnvVars::default();
        let exec = MockExecutor::with_responses(vec![
            (false, String::new()),
            (false, "git: 'lfs' is not a git command".to_string()),
            (true, String::new()),
            (true, "Git LFS initialized.".to_string()),
        ]);
        let dl = FakeDownloader::default();
        let ctx = ApplyContext::new(&m, darwin(), "/home/ada".as_ref(), &env, &exec, &dl)
            .with_package_manager(Some(Box::new(Brew)));

        let outcomes = apply_git(&ctx);
        assert!(outcomes[0].success && !outcomes[0].skipped);
        assert_eq!(outcomes[0].message, "enabled");
        assert_eq!(
            exec.calls()[1..],
            ["git lfs install", "brew install git-lfs", "git lfs install"]
        );
    }

    #[test]
    fn lfs_without_package_manager_reports_git_error() {
        let m = Manifest::from_value("/sync", json!({ "git": { "lfs": true } })).unwrap();
        let env = EnvVars::default();
        let exec = MockExecutor::with_responses(vec![
            (false, String::new()),
            (false, "git: 'lfs' is not a git command".to_string()),
        ]);
        let dl = FakeDownloader::default();
        let ctx = ApplyContext::new(&m, darwin(), "/home/ada".as_ref(), &env, &exec, &dl);

        let outcomes = apply_git(&ctx);
        assert_eq!(
            outcomes[0].error.as_deref(),
            Some("exit status 1: git: 'lfs' is not a git command")
        );
    }

    #[test]
    fn empty_git_section_does_nothing() {
        let m = Manifest::from_value("/sync", json!({ "git": {} })).unwrap();
        let env = EnvVars::default();
        let exec = MockExecutor::new();
        let dl = FakeDownloader::default();
        let ctx = ApplyContext::new(&m, darwin(), "/home/ada".as_ref(), &env, &exec, &dl);
        assert!(apply_git(&ctx).is_empty());
        assert_eq!(exec.call_count(), 0);
    }
}
