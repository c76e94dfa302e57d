//! HTTP downloads: GitHub release metadata and plain file downloads.
use anyhow::{Context as _, Result, bail};
use serde::Deserialize;
use std::fmt::Debug;
use std::fs::{self, File};
use std::path::Path;

use crate::exec::Executor;
use crate::platform::Platform;

const API_ROOT: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("pact/", env!("CARGO_PKG_VERSION"));

/// Network access used by the apply engine.
///
/// Engines never open connections directly so tests can substitute a fake
/// that serves canned releases and files.
pub trait Downloader: Debug {
    /// Metadata of the latest release of `repo` (`owner/name`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the repository has no
    /// releases.
    fn latest_release(&self, repo: &str) -> Result<Release>;

    /// Download `url` to `dest`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the file cannot be written.
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// A GitHub release.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Release {
    /// Downloadable assets attached to the release.
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A release asset.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    /// File name of the asset.
    pub name: String,
    /// Direct download URL.
    pub browser_download_url: String,
}

impl Release {
    /// The first asset whose lower-cased name mentions the OS and the
    /// architecture (any of its aliases).
    #[must_use]
    pub fn asset_for(&self, platform: Platform) -> Option<&Asset> {
        let os = platform.os.key();
        let arches = platform.arch.aliases();
        self.assets.iter().find(|asset| {
            let name = asset.name.to_lowercase();
            name.contains(os) && arches.iter().any(|arch| name.contains(arch))
        })
    }
}

/// [`Downloader`] backed by blocking `ureq` requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDownloader;

impl Downloader for HttpDownloader {
    fn latest_release(&self, repo: &str) -> Result<Release> {
        let url = format!("{API_ROOT}/repos/{}/releases/latest", repo.trim_matches('/'));
        tracing::debug!("fetching {url}");
        let mut response = match ureq::get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(_)) => bail!("no releases found for {repo}"),
            Err(e) => return Err(e).context("failed to fetch release info"),
        };
        response
            .body_mut()
            .read_json::<Release>()
            .context("failed to parse release info")
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::debug!("downloading {url} to {}", dest.display());
        let mut response = match ureq::get(url).header("User-Agent", USER_AGENT).call() {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(code)) => bail!("download failed: {code} {url}"),
            Err(e) => return Err(e).with_context(|| format!("failed to download {url}")),
        };

        super::fs::ensure_parent_dir(dest)?;
        let temp_path = dest.with_extension("download");
        let mut file = File::create(&temp_path)
            .with_context(|| format!("creating {}", temp_path.display()))?;
        std::io::copy(&mut response.body_mut().as_reader(), &mut file)
            .with_context(|| format!("writing {}", temp_path.display()))?;
        fs::rename(&temp_path, dest).with_context(|| {
            format!("moving {} to {}", temp_path.display(), dest.display())
        })?;
        Ok(())
    }
}

/// How a downloaded file is unpacked, judged from its URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `.tar.gz` / `.tgz`, extracted with `tar`.
    TarGz,
    /// `.zip`, extracted with `unzip`.
    Zip,
    /// Anything else is the binary itself.
    Binary,
}

impl ArchiveKind {
    /// Classify a download URL or file name.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Self::TarGz
        } else if lower.ends_with(".zip") {
            Self::Zip
        } else {
            Self::Binary
        }
    }
}

/// Unpack `archive` into `dest_dir` with the system `tar` or `unzip`.
///
/// # Errors
///
/// Returns an error if the destination cannot be created or the extractor
/// fails.
pub fn extract(
    kind: ArchiveKind,
    archive: &Path,
    dest_dir: &Path,
    executor: &dyn Executor,
) -> Result<()> {
    fs::create_dir_all(dest_dir).with_context(|| format!("creating {}", dest_dir.display()))?;
    let src = archive.to_string_lossy();
    let dest = dest_dir.to_string_lossy();
    let result = match kind {
        ArchiveKind::TarGz => executor.run_unchecked("tar", &["-xzf", &src, "-C", &dest])?,
        ArchiveKind::Zip => executor.run_unchecked("unzip", &["-o", &src, "-d", &dest])?,
        ArchiveKind::Binary => bail!("{} is not an archive", archive.display()),
    };
    if result.success {
        Ok(())
    } else {
        bail!("extracting {}: {}", archive.display(), result.failure_message())
    }
}

/// Copy a downloaded binary into place and mark it executable.
///
/// # Errors
///
/// Returns an error if the copy or permission change fails.
pub fn install_binary(downloaded: &Path, dest: &Path) -> Result<()> {
    super::fs::ensure_parent_dir(dest)?;
    fs::copy(downloaded, dest)
        .with_context(|| format!("copying {} to {}", downloaded.display(), dest.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dest, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("chmod {}", dest.display()))?;
    }
    Ok(())
}
