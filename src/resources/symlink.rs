//! Symlink resource.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::fs::{ensure_parent_dir, remove_existing};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A symlink at `target` pointing to `source`.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The source file/directory (what the symlink points to). Absolute.
    pub source: PathBuf,
    /// The target path (where the symlink will be created).
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.target)?;
        remove_existing(&self.target)?;
        create_symlink(&self.source, &self.target)
            .with_context(|| format!("create link: {}", self.target.display()))?;
        Ok(ResourceChange::Applied)
    }

    /// Remove the link only if `target` is actually a symlink.
    fn remove(&self) -> Result<ResourceChange> {
        let Ok(meta) = std::fs::symlink_metadata(&self.target) else {
            return Ok(ResourceChange::Skipped {
                reason: "target does not exist".to_string(),
            });
        };
        if !meta.is_symlink() {
            return Ok(ResourceChange::Skipped {
                reason: "target is not a symlink (was it copied?)".to_string(),
            });
        }
        remove_existing(&self.target)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source not found: {}", self.source.display()),
            });
        }

        match std::fs::read_link(&self.target) {
            Ok(existing) if paths_equal(&existing, &self.source) => Ok(ResourceState::Correct),
            Ok(existing) => Ok(ResourceState::Incorrect {
                current: format!("points to {}", existing.display()),
            }),
            Err(_) if self.target.symlink_metadata().is_ok() => Ok(ResourceState::Incorrect {
                current: if self.target.is_dir() {
                    "target is a directory".to_string()
                } else {
                    "target is a regular file".to_string()
                },
            }),
            Err(_) => Ok(ResourceState::Missing),
        }
    }
}

/// Compare two paths for equality, handling UNC prefix normalization on Windows.
fn paths_equal(a: &Path, b: &Path) -> bool {
    let normalize = |p: &Path| -> PathBuf {
        #[cfg(windows)]
        {
            let s = p.to_string_lossy();
            if let Some(stripped) = s.strip_prefix(r"\\?\") {
                return PathBuf::from(stripped);
            }
        }
        p.to_path_buf()
    };

    normalize(a) == normalize(b)
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    #[cfg(windows)]
    {
        let result = if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.with_context(|| {
            format!(
                "creating symlink {} -> {} (requires developer mode or admin)",
                link.display(),
                target.display()
            )
        })?;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn paths_equal_works() {
        assert!(paths_equal(Path::new("/tmp/test"), Path::new("/tmp/test")));
        assert!(!paths_equal(Path::new("/tmp/test"), Path::new("/tmp/other")));
    }

    #[test]
    fn invalid_when_source_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let resource =
            SymlinkResource::new(tmp.path().join("nonexistent"), tmp.path().join("target"));
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }

    #[test]
    fn missing_when_target_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("source");
        std::fs::write(&source, "test").unwrap();
        let resource = SymlinkResource::new(source, tmp.path().join("target"));
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
    }

    #[cfg(unix)]
    #[test]
    fn apply_creates_link_then_reports_correct() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("dotfiles/.zshrc");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, "export A=1").unwrap();
        let target = tmp.path().join("home/.zshrc");

        let resource = SymlinkResource::new(source.clone(), target.clone());
        assert_eq!(resource.ensure().unwrap(), ResourceChange::Applied);
        assert_eq!(std::fs::read_link(&target).unwrap(), source);
        assert_eq!(resource.ensure().unwrap(), ResourceChange::AlreadyCorrect);
    }

    #[cfg(unix)]
    #[test]
    fn apply_replaces_wrong_link_and_real_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("source");
        let other = tmp.path().join("other");
        std::fs::write(&source, "test").unwrap();
        std::fs::write(&other, "other").unwrap();

        let wrong_link = tmp.path().join("wrong");
        std::os::unix::fs::symlink(&other, &wrong_link).unwrap();
        let resource = SymlinkResource::new(source.clone(), wrong_link.clone());
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Incorrect { .. }
        ));
        resource.apply().unwrap();
        assert_eq!(std::fs::read_link(&wrong_link).unwrap(), source);
        assert_eq!(std::fs::read_to_string(&other).unwrap(), "other");

        let real_dir = tmp.path().join("dir");
        std::fs::create_dir_all(real_dir.join("inner")).unwrap();
        let resource = SymlinkResource::new(source.clone(), real_dir.clone());
        assert_eq!(
            resource.current_state().unwrap(),
            ResourceState::Incorrect {
                current: "target is a directory".to_string()
            }
        );
        resource.apply().unwrap();
        assert_eq!(std::fs::read_link(&real_dir).unwrap(), source);
    }

    #[cfg(unix)]
    #[test]
    fn remove_only_touches_symlinks() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("source");
        std::fs::write(&source, "x").unwrap();

        let linked = SymlinkResource::new(source.clone(), tmp.path().join("linked"));
        linked.apply().unwrap();
        assert_eq!(linked.remove().unwrap(), ResourceChange::Applied);
        assert!(linked.target.symlink_metadata().is_err());
        assert!(source.exists());

        let copied_target = tmp.path().join("copied");
        std::fs::write(&copied_target, "x").unwrap();
        let copied = SymlinkResource::new(source.clone(), copied_target.clone());
        assert_eq!(
            copied.remove().unwrap(),
            ResourceChange::Skipped {
                reason: "target is not a symlink (was it copied?)".to_string()
            }
        );
        assert!(copied_target.exists());

        let absent = SymlinkResource::new(source, tmp.path().join("absent"));
        assert_eq!(
            absent.remove().unwrap(),
            ResourceChange::Skipped {
                reason: "target does not exist".to_string()
            }
        );
    }
}
