//! Nerd Font resource.
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use super::download::{self, ArchiveKind, Downloader};
use super::package::PackageManager;
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::PlatformError;
use crate::exec::Executor;
use crate::platform::{Os, Platform};

const NERD_FONTS_RELEASE: &str = "https://github.com/ryanoasis/nerd-fonts/releases/latest/download";

/// Strip spaces and any "Nerd Font" suffix: `"JetBrains Mono Nerd Font"`
/// becomes `"JetBrainsMono"`, the name used by the nerd-fonts archives.
#[must_use]
pub fn nerd_font_name(font: &str) -> String {
    font.replace(' ', "")
        .replace("NerdFont", "")
        .trim()
        .to_string()
}

/// A Nerd Font installed for the current user.
///
/// macOS installs through Homebrew casks; Linux and Windows download the
/// archive from the nerd-fonts release feed and unpack it into the user
/// font directory.
#[derive(Debug)]
pub struct FontResource<'a> {
    /// Font as written in the manifest.
    pub font: String,
    platform: Platform,
    home: PathBuf,
    executor: &'a dyn Executor,
    downloader: &'a dyn Downloader,
    package_manager: Option<&'a dyn PackageManager>,
}

impl<'a> FontResource<'a> {
    /// Create a new font resource.
    #[must_use]
    pub fn new(
        font: &str,
        platform: Platform,
        home: &Path,
        executor: &'a dyn Executor,
        downloader: &'a dyn Downloader,
        package_manager: Option<&'a dyn PackageManager>,
    ) -> Self {
        Self {
            font: font.to_string(),
            platform,
            home: home.to_path_buf(),
            executor,
            downloader,
            package_manager,
        }
    }

    /// Directory the archive is unpacked into on Linux and Windows.
    #[must_use]
    pub fn user_font_dir(&self) -> PathBuf {
        match self.platform.os {
            Os::Windows => self.home.join("AppData/Local/Microsoft/Windows/Fonts"),
            Os::Darwin => self.home.join("Library/Fonts"),
            Os::Linux => self.home.join(".local/share/fonts"),
        }
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        match self.platform.os {
            Os::Darwin => vec![
                PathBuf::from("/Library/Fonts"),
                PathBuf::from("/System/Library/Fonts"),
                self.user_font_dir(),
            ],
            Os::Windows => vec![PathBuf::from(r"C:\Windows\Fonts"), self.user_font_dir()],
            Os::Linux => vec![],
        }
    }

    /// Whether a font file or family matching the name is already present.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        let needle = self.font.replace(' ', "").to_lowercase();
        if self.platform.os == Os::Linux {
            let Ok(result) = self.executor.run_unchecked("fc-list", &[":", "family"]) else {
                return false;
            };
            return result
                .stdout
                .lines()
                .any(|family| family.replace(' ', "").to_lowercase().contains(&needle));
        }
        self.search_dirs().iter().any(|dir| {
            fs::read_dir(dir).is_ok_and(|entries| {
                entries.filter_map(Result::ok).any(|entry| {
                    entry
                        .file_name()
                        .to_string_lossy()
                        .to_lowercase()
                        .contains(&needle)
                })
            })
        })
    }

    /// Message reported after a successful install.
    #[must_use]
    pub const fn installed_message(&self) -> &'static str {
        match self.platform.os {
            Os::Darwin => "installed via Homebrew",
            Os::Linux => "installed to ~/.local/share/fonts",
            Os::Windows => "installed to Windows Fonts",
        }
    }

    fn install_cask(&self) -> Result<()> {
        let Some(brew) = self.package_manager.filter(|pm| pm.name() == "brew") else {
            return Err(PlatformError::Unsupported {
                os: self.platform.os.to_string(),
            }
            .into());
        };
        let base = nerd_font_name(&self.font);
        let cask = format!("font-{}-nerd-font", base.to_lowercase());
        if brew.install_app(&cask, self.executor).is_ok() {
            return Ok(());
        }
        let alternative = format!(
            "font-{}-nerd-font",
            base.replace("Mono", "-mono").to_lowercase()
        );
        brew.install_app(&alternative, self.executor)
            .map_err(|e| anyhow::anyhow!("failed to install font: {e}"))
    }

    fn install_archive(&self) -> Result<()> {
        let base = nerd_font_name(&self.font);
        let url = format!("{NERD_FONTS_RELEASE}/{base}.zip");
        let archive =
            std::env::temp_dir().join(format!("pact-{base}-{}.zip", std::process::id()));
        self.downloader.download(&url, &archive)?;
        let result = download::extract(ArchiveKind::Zip, &archive, &self.user_font_dir(), self.executor);
        if let Err(e) = fs::remove_file(&archive) {
            tracing::debug!("removing {}: {e}", archive.display());
        }
        result?;
        if self.platform.os == Os::Linux {
            // A stale cache only delays pickup; the font files are in place.
            if let Err(e) = self.executor.run_unchecked("fc-cache", &["-fv"]) {
                tracing::debug!("fc-cache failed: {e}");
            }
        }
        Ok(())
    }
}

impl Applicable for FontResource<'_> {
    fn description(&self) -> String {
        self.font.clone()
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.platform.os {
            Os::Darwin => self.install_cask()?,
            Os::Linux | Os::Windows => self.install_archive()?,
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for FontResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(if self.is_installed() {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::platform::Arch;
    use crate::resources::download::Release;
    use crate::resources::package::{Apt, Brew};
    use crate::resources::test_helpers::MockExecutor;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct FakeDownloader {
        urls: Mutex<Vec<String>>,
    }

    impl Downloader for FakeDownloader {
        fn latest_release(&self, _repo: &str) -> Result<Release> {
            Ok(Release::default())
        }

        fn download(&self, url: &str, dest: &Path) -> Result<()> {
            self.urls.lock().unwrap().push(url.to_string());
            fs::write(dest, b"zip")?;
            Ok(())
        }
    }

    #[test]
    fn normalises_nerd_font_names() {
        assert_eq!(nerd_font_name("JetBrains Mono Nerd Font"), "JetBrainsMono");
        assert_eq!(nerd_font_name("FiraCode NerdFont"), "FiraCode");
        assert_eq!(nerd_font_name("Hack"), "Hack");
    }

    #[test]
    fn linux_checks_fc_list_case_insensitively() {
        let tmp = tempfile::tempdir().unwrap();
        let exec = MockExecutor::ok("JetBrainsMono Nerd Font,JetBrainsMono NF\nDejaVu Sans\n");
        let dl = FakeDownloader::default();
        let font = FontResource::new(
            "jetbrainsmono nerd font",
            Platform::new(Os::Linux, Arch::Amd64),
            tmp.path(),
            &exec,
            &dl,
            None,
        );
        assert_eq!(font.ensure().unwrap(), ResourceChange::AlreadyCorrect);
        assert!(dl.urls.lock().unwrap().is_empty());
    }

    #[test]
    fn linux_matches_spaced_name_against_joined_family() {
        let tmp = tempfile::tempdir().unwrap();
        let exec = MockExecutor::ok("JetBrainsMono Nerd Font,JetBrainsMono NF\n");
        let dl = FakeDownloader::default();
        let font = FontResource::new(
            "JetBrains Mono Nerd Font",
            Platform::new(Os::Linux, Arch::Amd64),
            tmp.path(),
            &exec,
            &dl,
            None,
        );
        assert_eq!(font.ensure().unwrap(), ResourceChange::AlreadyCorrect);
        assert_eq!(exec.calls(), vec!["fc-list : family"]);
        assert!(dl.urls.lock().unwrap().is_empty());
    }

    #[test]
    fn linux_downloads_and_unpacks_into_user_fonts() {
        let tmp = tempfile::tempdir().unwrap();
        let exec = MockExecutor::with_responses(vec![
            (true, "DejaVu Sans\n".to_string()),
            (true, String::new()),
            (true, String::new()),
        ]);
        let dl = FakeDownloader::default();
        let font = FontResource::new(
            "Fira Code Nerd Font",
            Platform::new(Os::Linux, Arch::Amd64),
            tmp.path(),
            &exec,
            &dl,
            Some(&Apt),
        );
        assert_eq!(font.ensure().unwrap(), ResourceChange::Applied);
        assert_eq!(
            dl.urls.lock().unwrap().as_slice(),
            [format!("{NERD_FONTS_RELEASE}/FiraCode.zip")]
        );
        let calls = exec.calls();
        assert!(calls[1].starts_with("unzip -o "));
        assert!(
            calls[1].contains(&format!("pact-FiraCode-{}.zip", std::process::id())),
            "{}",
            calls[1]
        );
        assert!(calls[1].ends_with(&tmp.path().join(".local/share/fonts").display().to_string()));
        assert_eq!(calls[2], "fc-cache -fv");
        assert_eq!(font.installed_message(), "installed to ~/.local/share/fonts");
    }

    #[test]
    fn darwin_falls_back_to_alternative_cask_name() {
        let tmp = tempfile::tempdir().unwrap();
        let exec = MockExecutor::with_responses(vec![
            (false, "no cask".to_string()),
            (true, String::new()),
        ]);
        let dl = FakeDownloader::default();
        let font = FontResource::new(
            "Ubuntu Mono Nerd Font",
            Platform::new(Os::Darwin, Arch::Arm64),
            tmp.path(),
            &exec,
            &dl,
            Some(&Brew),
        );
        font.apply().unwrap();
        assert_eq!(
            exec.calls(),
            vec![
                "brew install --cask font-ubuntumono-nerd-font",
                "brew install --cask font-ubuntu-mono-nerd-font",
            ]
        );
    }

    #[test]
    fn darwin_without_brew_is_unsupported() {
        let tmp = tempfile::tempdir().unwrap();
        let exec = MockExecutor::new();
        let dl = FakeDownloader::default();
        let font = FontResource::new(
            "Hack",
            Platform::new(Os::Darwin, Arch::Arm64),
            tmp.path(),
            &exec,
            &dl,
            None,
        );
        assert_eq!(
            font.apply().unwrap_err().to_string(),
            "operation not supported on darwin"
        );
    }

    #[test]
    fn windows_finds_font_in_user_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let exec = MockExecutor::new();
        let dl = FakeDownloader::default();
        let font = FontResource::new(
            "Cascadia Code",
            Platform::new(Os::Windows, Arch::Amd64),
            tmp.path(),
            &exec,
            &dl,
            None,
        );
        assert!(!font.is_installed());
        fs::create_dir_all(font.user_font_dir()).unwrap();
        fs::write(font.user_font_dir().join("CascadiaCodeNF-Regular.ttf"), "").unwrap();
        assert!(font.is_installed());
    }
}
