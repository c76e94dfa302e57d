//! Terminal font from known terminal emulator configs.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::TerminalDetected;
use crate::platform::Os;

/// Font-family patterns; group 1 is the family name.
static FONT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // alacritty (toml and yaml)
        r#"(?m)^\s*family\s*[=:]\s*["']?([^"'\n]+?)["']?\s*$"#,
        // kitty
        r"(?m)^\s*font_family\s+(.+?)\s*$",
        // ghostty
        r#"(?m)^\s*font-family\s*=\s*["']?([^"'\n]+?)["']?\s*$"#,
        // wezterm
        r#"wezterm\.font(?:_with_fallback)?\s*\(?\s*\{?\s*["']([^"']+)["']"#,
        // windows terminal
        r#""face"\s*:\s*"([^"]+)""#,
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

fn terminal_configs(os: Os, home: &Path) -> Vec<PathBuf> {
    let mut paths = vec![
        home.join(".config/alacritty/alacritty.toml"),
        home.join(".config/alacritty/alacritty.yml"),
        home.join(".config/kitty/kitty.conf"),
        home.join(".config/ghostty/config"),
        home.join(".wezterm.lua"),
        home.join(".config/wezterm/wezterm.lua"),
    ];
    match os {
        Os::Darwin => paths.push(home.join("Library/Application Support/com.mitchellh.ghostty/config")),
        Os::Windows => {
            paths.push(home.join("AppData/Roaming/alacritty/alacritty.toml"));
            paths.push(home.join(
                "AppData/Local/Packages/Microsoft.WindowsTerminal_8wekyb3d8bbwe/LocalState/settings.json",
            ));
        }
        Os::Linux => {}
    }
    paths
}

/// Font family named in terminal config text, if any.
#[must_use]
pub fn parse_font_family(content: &str) -> Option<String> {
    FONT_PATTERNS
        .iter()
        .find_map(|re| re.captures(content)?.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|family| !family.is_empty())
}

/// The font of the first terminal config that names one.
#[must_use]
pub fn detect_terminal(os: Os, home: &Path) -> TerminalDetected {
    let font = terminal_configs(os, home)
        .iter()
        .filter_map(|path| fs::read_to_string(path).ok())
        .find_map(|content| parse_font_family(&content))
        .unwrap_or_default();
    TerminalDetected { font }
}
