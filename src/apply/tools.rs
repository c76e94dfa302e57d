//! `cli` module: package-manager tools and custom tools from GitHub releases.
use anyhow::{Result, anyhow};
use std::fs;

use super::ApplyContext;
use crate::error::PlatformError;
use crate::outcome::{Category, Outcome};
use crate::resources::download::{self, ArchiveKind};

const MODULE: &str = "cli";

/// GitHub repository that publishes releases for a known custom tool.
#[must_use]
pub fn custom_tool_repo(tool: &str) -> Option<&'static str> {
    match tool {
        "pact" => Some("cloudboy-jh/pact"),
        "churn" => Some("cloudboy-jh/churn"),
        "annotr" => Some("cloudboy-jh/annotr"),
        _ => None,
    }
}

/// Install `cli.tools` through the package manager and `cli.custom` from
/// GitHub releases.
#[must_use]
pub fn apply_cli_tools(ctx: &ApplyContext<'_>) -> Vec<Outcome> {
    let mut outcomes = Vec::new();

    let tools = ctx.manifest.get_string_slice("cli.tools");
    if !tools.is_empty() {
        if ctx.package_manager().is_some() {
            outcomes.extend(
                tools
                    .iter()
                    .map(|tool| ctx.install_package(MODULE, tool, tool, tool)),
            );
        } else {
            let err = PlatformError::NoPackageManager {
                os: ctx.platform.os.to_string(),
            };
            outcomes.push(Outcome::fail(Category::Install, MODULE, "package-manager", err));
        }
    }

    for tool in ctx.manifest.get_string_slice("cli.custom") {
        outcomes.push(install_custom_tool(ctx, &tool));
    }
    outcomes
}

fn install_custom_tool(ctx: &ApplyContext<'_>, tool: &str) -> Outcome {
    if ctx.executor.which(tool) {
        return Outcome::skip(Category::Install, MODULE, tool, "already installed");
    }
    let Some(repo) = custom_tool_repo(tool) else {
        if ctx.package_manager().is_some() {
            return ctx.install_package(MODULE, tool, tool, tool);
        }
        return Outcome::fail(
            Category::Install,
            MODULE,
            tool,
            "unknown custom tool and no package manager available",
        );
    };
    match install_from_release(ctx, tool, repo) {
        Ok(()) => Outcome::ok(Category::Install, MODULE, tool, format!("installed from {repo}")),
        Err(e) => Outcome::fail(Category::Install, MODULE, tool, format!("{e:#}")),
    }
}

fn install_from_release(ctx: &ApplyContext<'_>, tool: &str, repo: &str) -> Result<()> {
    let release = ctx.downloader.latest_release(repo)?;
    let asset = release.asset_for(ctx.platform).ok_or_else(|| {
        anyhow!(
            "no compatible release found for {}/{}",
            ctx.platform.os,
            ctx.platform.arch
        )
    })?;
    tracing::debug!("{tool}: using release asset {}", asset.name);

    let downloaded = std::env::temp_dir().join(format!("pact-{tool}-{}", std::process::id()));
    ctx.downloader
        .download(&asset.browser_download_url, &downloaded)?;

    let result = match ArchiveKind::from_url(&asset.browser_download_url) {
        ArchiveKind::Binary => {
            let name = if ctx.platform.is_windows() {
                format!("{tool}.exe")
            } else {
                tool.to_string()
            };
            download::install_binary(&downloaded, &ctx.bin_dir.join(name))
        }
        kind => download::extract(kind, &downloaded, &ctx.bin_dir, ctx.executor),
    };
    if let Err(e) = fs::remove_file(&downloaded) {
        tracing::debug!("removing {}: {e}", downloaded.display());
    }
    result
}
