//! `shell` module: prompt tool, prompt theme, and init lines for shell tools.
use std::path::{Path, PathBuf};

use super::ApplyContext;
use crate::outcome::{Category, Outcome};
use crate::platform::{Os, Platform};
use crate::resources::shell_init::ShellInitResource;
use crate::resources::{Resource, ResourceChange};

const MODULE: &str = "shell";

/// The resource file init lines are appended to, and the shell name used
/// inside POSIX init snippets.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ShellTarget {
    rc_file: PathBuf,
    name: &'static str,
}

impl ShellTarget {
    fn resolve(ctx: &ApplyContext<'_>) -> Self {
        if ctx.platform.is_windows() {
            return Self {
                rc_file: ctx
                    .home
                    .join("Documents/PowerShell/Microsoft.PowerShell_profile.ps1"),
                name: "pwsh",
            };
        }
        // Anything that is not bash gets the zsh setup.
        let shell = ctx.env.get("SHELL").unwrap_or_default();
        if shell.contains("bash") && !shell.contains("zsh") {
            Self {
                rc_file: ctx.home.join(".bashrc"),
                name: "bash",
            }
        } else {
            Self {
                rc_file: ctx.home.join(".zshrc"),
                name: "zsh",
            }
        }
    }
}

/// Directory a prompt tool reads themes from; `None` for unknown tools.
fn theme_dir(tool: &str, os: Os, home: &Path) -> Option<PathBuf> {
    match (tool, os) {
        ("oh-my-posh", Os::Windows) => Some(home.join("AppData/Local/Programs/oh-my-posh/themes")),
        ("oh-my-posh", Os::Darwin | Os::Linux) => Some(home.join(".config/oh-my-posh/themes")),
        ("starship", _) => Some(home.join(".config")),
        _ => None,
    }
}

fn theme_path(tool: &str, theme: &str, os: Os, home: &Path) -> Option<PathBuf> {
    theme_dir(tool, os, home).map(|dir| dir.join(format!("{theme}.omp.json")))
}

fn prompt_init_line(
    tool: &str,
    theme: &str,
    target: &ShellTarget,
    platform: Platform,
    home: &Path,
) -> Option<String> {
    let windows = platform.is_windows();
    match tool {
        "oh-my-posh" => {
            let config = theme_path(tool, theme, platform.os, home)?;
            Some(if windows {
                format!(
                    "oh-my-posh init pwsh --config '{}' | Invoke-Expression",
                    config.display()
                )
            } else {
                format!(
                    "eval \"$(oh-my-posh init {} --config '{}')\"",
                    target.name,
                    config.display()
                )
            })
        }
        "starship" if windows => Some("Invoke-Expression (&starship init powershell)".to_string()),
        "starship" => Some(format!("eval \"$(starship init {})\"", target.name)),
        _ => None,
    }
}

fn tool_init_line(tool: &str, target: &ShellTarget, os: Os) -> Option<String> {
    if os == Os::Windows {
        return (tool == "zoxide")
            .then(|| "Invoke-Expression (& { (zoxide init powershell | Out-String) })".to_string());
    }
    match tool {
        "zoxide" => Some(format!("eval \"$(zoxide init {})\"", target.name)),
        "fzf" => Some("[ -f ~/.fzf.zsh ] && source ~/.fzf.zsh".to_string()),
        "direnv" => Some(format!("eval \"$(direnv hook {})\"", target.name)),
        _ => None,
    }
}

fn append_init(target: &ShellTarget, name: &str, marker: &str, line: &str) -> Outcome {
    let resource = ShellInitResource::new(target.rc_file.clone(), marker, line);
    match resource.ensure() {
        Ok(ResourceChange::Applied) => Outcome::ok(
            Category::Configure,
            MODULE,
            name,
            format!("added to {}", resource.file_name()),
        ),
        Ok(ResourceChange::AlreadyCorrect) => {
            Outcome::skip(Category::Configure, MODULE, name, "already configured")
        }
        Ok(ResourceChange::Skipped { reason }) => {
            Outcome::skip(Category::Configure, MODULE, name, reason)
        }
        Err(e) => Outcome::fail(Category::Configure, MODULE, name, format!("{e:#}")),
    }
}

fn download_theme(ctx: &ApplyContext<'_>, tool: &str, theme: &str, source: &str) -> Outcome {
    let name = format!("{tool}-theme");
    let Some(path) = theme_path(tool, theme, ctx.platform.os, &ctx.home) else {
        return Outcome::skip(Category::Configure, MODULE, &name, "unknown prompt tool");
    };
    if path.exists() {
        return Outcome::skip(Category::Configure, MODULE, &name, "theme already exists");
    }
    let downloaded = crate::resources::fs::ensure_parent_dir(&path)
        .and_then(|()| ctx.downloader.download(source, &path));
    match downloaded {
        Ok(()) => Outcome::ok(
            Category::Configure,
            MODULE,
            &name,
            format!("downloaded to {}", path.display()),
        ),
        Err(e) => Outcome::fail(
            Category::Configure,
            MODULE,
            &name,
            format!("failed to download theme: {e:#}"),
        ),
    }
}

/// Install the prompt tool and its theme, wire it into the shell resource
/// file, then install each `shell.tools` entry with its init snippet.
#[must_use]
pub fn apply_shell(ctx: &ApplyContext<'_>) -> Vec<Outcome> {
    let mut outcomes = Vec::new();
    let target = ShellTarget::resolve(ctx);

    let prompt = ctx.manifest.get_str("shell.prompt.tool");
    if !prompt.is_empty() {
        if ctx.package_manager().is_some() {
            outcomes.push(ctx.install_package(MODULE, prompt, prompt, prompt));
        }

        let theme = ctx.manifest.get_str("shell.prompt.theme");
        let source = ctx.manifest.get_str("shell.prompt.source");
        if !theme.is_empty() && !source.is_empty() {
            outcomes.push(download_theme(ctx, prompt, theme, source));
        }

        outcomes.push(
            match prompt_init_line(prompt, theme, &target, ctx.platform, &ctx.home) {
                Some(line) => append_init(&target, "shell-config", prompt, &line),
                None => Outcome::skip(
                    Category::Configure,
                    MODULE,
                    "shell-config",
                    "no init line for this prompt tool",
                ),
            },
        );
    }

    for tool in ctx.manifest.get_string_slice("shell.tools") {
        if ctx.package_manager().is_some() {
            outcomes.push(ctx.install_package(MODULE, &tool, &tool, &tool));
        }
        if let Some(line) = tool_init_line(&tool, &target, ctx.platform.os) {
            outcomes.push(append_init(&target, &format!("{tool}-init"), &tool, &line));
        }
    }
    outcomes
}
