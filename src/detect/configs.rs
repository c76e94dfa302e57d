//! Config files at well-known per-OS locations.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::platform::Os;
use crate::resources::fs::{copy_path, ensure_parent_dir, same_content};

/// Candidate paths for one config file; the first existing one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    /// Name shown to the user and used as the file name under the sync root.
    pub name: &'static str,
    /// Module the file belongs to.
    pub module: &'static str,
    /// Absolute candidate paths, in priority order.
    pub paths: Vec<PathBuf>,
    /// Directory under the sync root the file is copied into.
    pub dest_subdir: &'static str,
    /// Whether the location is a directory rather than a file.
    pub is_dir: bool,
}

impl ConfigLocation {
    fn file(name: &'static str, module: &'static str, dest_subdir: &'static str, paths: Vec<PathBuf>) -> Self {
        Self {
            name,
            module,
            paths,
            dest_subdir,
            is_dir: false,
        }
    }

    fn dir(name: &'static str, module: &'static str, path: PathBuf) -> Self {
        Self {
            name,
            module,
            paths: vec![path],
            dest_subdir: module,
            is_dir: true,
        }
    }
}

/// A config file found on this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// Location name, e.g. `zshrc`.
    pub name: String,
    /// Where the file was found.
    pub source_path: PathBuf,
    /// `/`-separated destination relative to the sync root.
    pub dest_path: String,
    /// Owning module.
    pub module: String,
    /// Whether this is a directory.
    pub is_dir: bool,
}

impl ConfigFile {
    /// Copy into `root` at [`dest_path`](Self::dest_path), recursively for
    /// directories. Returns the destination; an identical copy is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be created or the copy fails.
    pub fn copy_into(&self, root: &Path) -> Result<PathBuf> {
        let dest = root.join(&self.dest_path);
        if same_content(&self.source_path, &dest) {
            tracing::debug!("{} already up to date", dest.display());
            return Ok(dest);
        }
        ensure_parent_dir(&dest)?;
        copy_path(&self.source_path, &dest)?;
        tracing::debug!("copied {} to {}", self.source_path.display(), dest.display());
        Ok(dest)
    }
}

/// Known config locations for `os` under `home`.
#[must_use]
pub fn config_locations(os: Os, home: &Path) -> Vec<ConfigLocation> {
    let mut locations = vec![
        ConfigLocation::file("zshrc", "shell", "shell", vec![home.join(".zshrc")]),
        ConfigLocation::file("bashrc", "shell", "shell", vec![home.join(".bashrc")]),
        ConfigLocation::file(
            "profile",
            "shell",
            "shell",
            vec![home.join(".profile"), home.join(".zprofile")],
        ),
        ConfigLocation::file("gitconfig", "git", "git", vec![home.join(".gitconfig")]),
        ConfigLocation::file(
            "gitignore_global",
            "git",
            "git",
            vec![home.join(".gitignore_global"), home.join(".gitignore")],
        ),
        ConfigLocation::file(
            "lazygit",
            "tools",
            "tools",
            vec![home.join(".config/lazygit/config.yml")],
        ),
        ConfigLocation::file(
            "starship",
            "tools",
            "tools",
            vec![home.join(".config/starship.toml")],
        ),
    ];

    match os {
        Os::Darwin => {
            let support = home.join("Library/Application Support");
            locations.extend([
                ConfigLocation::dir("nvim", "editor", home.join(".config/nvim")),
                ConfigLocation::file(
                    "vscode-settings",
                    "editor",
                    "editor/vscode",
                    vec![support.join("Code/User/settings.json")],
                ),
                ConfigLocation::file(
                    "vscode-keybindings",
                    "editor",
                    "editor/vscode",
                    vec![support.join("Code/User/keybindings.json")],
                ),
                ConfigLocation::file(
                    "cursor-settings",
                    "editor",
                    "editor/cursor",
                    vec![support.join("Cursor/User/settings.json")],
                ),
                ConfigLocation::file(
                    "zed-settings",
                    "editor",
                    "editor/zed",
                    vec![home.join(".config/zed/settings.json")],
                ),
            ]);
        }
        Os::Linux => locations.extend([
            ConfigLocation::dir("nvim", "editor", home.join(".config/nvim")),
            ConfigLocation::file(
                "vscode-settings",
                "editor",
                "editor/vscode",
                vec![home.join(".config/Code/User/settings.json")],
            ),
            ConfigLocation::file(
                "vscode-keybindings",
                "editor",
                "editor/vscode",
                vec![home.join(".config/Code/User/keybindings.json")],
            ),
        ]),
        Os::Windows => locations.extend([
            ConfigLocation::file(
                "powershell-profile",
                "shell",
                "shell",
                vec![
                    home.join("Documents/PowerShell/Microsoft.PowerShell_profile.ps1"),
                    home.join("Documents/WindowsPowerShell/Microsoft.PowerShell_profile.ps1"),
                ],
            ),
            ConfigLocation::dir("nvim", "editor", home.join("AppData/Local/nvim")),
            ConfigLocation::file(
                "vscode-settings",
                "editor",
                "editor/vscode",
                vec![home.join("AppData/Roaming/Code/User/settings.json")],
            ),
            ConfigLocation::file(
                "vscode-keybindings",
                "editor",
                "editor/vscode",
                vec![home.join("AppData/Roaming/Code/User/keybindings.json")],
            ),
        ]),
    }
    locations
}

/// Config files that exist, at most one per location. A path of the wrong
/// kind (a file where a directory is expected, or the reverse) is ignored.
#[must_use]
pub fn discover_config_files(os: Os, home: &Path) -> Vec<ConfigFile> {
    config_locations(os, home)
        .into_iter()
        .filter_map(|loc| {
            let source = loc
                .paths
                .iter()
                .find(|p| fs::metadata(p).is_ok_and(|m| m.is_dir() == loc.is_dir))?;
            Some(ConfigFile {
                name: loc.name.to_string(),
                source_path: source.clone(),
                dest_path: format!("{}/{}", loc.dest_subdir, loc.name),
                module: loc.module.to_string(),
                is_dir: loc.is_dir,
            })
        })
        .collect()
}
