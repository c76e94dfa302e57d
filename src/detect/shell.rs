//! Shell type and prompt detection.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::tools::{KNOWN_PROMPT_TOOLS, KNOWN_SHELL_TOOLS};
use super::{PromptInfo, ShellDetected};
use crate::exec::Executor;
use crate::platform::{EnvVars, Os, Platform};

/// `oh-my-posh init <shell> --config <path>`, quoted or bare.
static OMP_CONFIG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"oh-my-posh.*--config\s+['"]?([^'"\s)]+)['"]?"#).ok());

/// Shell name from the platform and `$SHELL`.
///
/// On Windows, `PSModulePath` means PowerShell; anything else is `cmd`.
#[must_use]
pub fn detect_shell_type(os: Os, env: &EnvVars) -> String {
    if os == Os::Windows {
        let kind = if env.is_set("PSModulePath") { "powershell" } else { "cmd" };
        return kind.to_string();
    }
    let shell = env.get("SHELL").unwrap_or_default();
    ["zsh", "bash", "fish"]
        .into_iter()
        .find(|name| shell.contains(name))
        .map_or_else(
            || shell.rsplit('/').next().unwrap_or_default().to_string(),
            str::to_string,
        )
}

/// Theme name and remote source from shell config text.
///
/// Returns `None` when no `oh-my-posh ... --config` invocation is present.
/// The source is only set for `http(s)` theme locations.
#[must_use]
pub fn parse_prompt_theme(content: &str) -> Option<(String, String)> {
    let location = OMP_CONFIG.as_ref()?.captures(content)?.get(1)?.as_str();
    let file = location.rsplit(['/', '\\']).next().unwrap_or(location);
    let theme = file.strip_suffix(".omp.json").unwrap_or(file).to_string();
    let source = if location.starts_with("http") {
        location.to_string()
    } else {
        String::new()
    };
    Some((theme, source))
}

fn shell_config_files(os: Os, home: &Path) -> Vec<PathBuf> {
    match os {
        Os::Windows => vec![
            home.join("Documents/PowerShell/Microsoft.PowerShell_profile.ps1"),
            home.join("Documents/WindowsPowerShell/Microsoft.PowerShell_profile.ps1"),
        ],
        Os::Darwin | Os::Linux => vec![
            home.join(".zshrc"),
            home.join(".bashrc"),
            home.join(".config/fish/config.fish"),
        ],
    }
}

fn detect_prompt(os: Os, home: &Path, executor: &dyn Executor) -> Option<PromptInfo> {
    let tool = KNOWN_PROMPT_TOOLS.iter().find(|t| executor.which(t))?;
    let mut info = PromptInfo {
        tool: (*tool).to_string(),
        ..PromptInfo::default()
    };
    if *tool == "oh-my-posh"
        && let Some((theme, source)) = shell_config_files(os, home)
            .iter()
            .filter_map(|path| fs::read_to_string(path).ok())
            .find_map(|content| parse_prompt_theme(&content))
    {
        info.theme = theme;
        info.source = source;
    }
    Some(info)
}

/// Shell type, prompt tool and theme, and installed shell helper tools.
#[must_use]
pub fn detect_shell(
    platform: Platform,
    home: &Path,
    env: &EnvVars,
    executor: &dyn Executor,
) -> ShellDetected {
    ShellDetected {
        kind: detect_shell_type(platform.os, env),
        prompt: detect_prompt(platform.os, home, executor),
        tools: KNOWN_SHELL_TOOLS
            .iter()
            .filter(|tool| executor.which(tool))
            .map(|tool| (*tool).to_string())
            .collect(),
    }
}
