//! File-system helpers shared by the file resources and the merge engine.
use anyhow::{Context as _, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove whatever exists at `path`: a file, a symlink (including a broken
/// one), or a whole directory tree. Does nothing if `path` does not exist.
///
/// Symlinks are never followed, so removing a link to a directory leaves the
/// directory itself untouched.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<()> {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return Ok(());
    };
    if meta.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("remove existing directory: {}", path.display()))
    } else if meta.is_symlink() && is_dir_link(path) {
        // Directory symlinks and junctions on Windows need remove_dir.
        fs::remove_dir(path)
            .or_else(|_| fs::remove_file(path))
            .with_context(|| format!("remove existing link: {}", path.display()))
    } else {
        fs::remove_file(path).with_context(|| format!("remove existing: {}", path.display()))
    }
}

#[cfg(windows)]
fn is_dir_link(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    fs::symlink_metadata(path).is_ok_and(|m| m.file_attributes() & 0x10 != 0)
}

#[cfg(not(windows))]
const fn is_dir_link(_path: &Path) -> bool {
    false
}

/// Copy a single file, preserving its permission bits.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    // fs::copy carries the permission bits across on every platform.
    fs::copy(src, dst)
        .with_context(|| format!("copying {} to {}", src.display(), dst.display()))?;
    Ok(())
}

/// Recursively copy a directory tree, preserving permission bits of every
/// file and directory.
///
/// Symlinks within the source tree are followed: their content is copied,
/// not the link itself.
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, a source
/// entry cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).with_context(|| format!("creating directory {}", dst.display()))?;
    for entry in fs::read_dir(src).with_context(|| format!("reading directory {}", src.display()))? {
        let entry = entry.with_context(|| format!("reading entry in {}", src.display()))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            copy_file(&src_path, &dst_path)?;
        }
    }
    let perms = fs::metadata(src)
        .with_context(|| format!("reading metadata {}", src.display()))?
        .permissions();
    fs::set_permissions(dst, perms)
        .with_context(|| format!("setting permissions on {}", dst.display()))?;
    Ok(())
}

/// Copy `src` to `dst`, recursing when `src` is a directory.
///
/// # Errors
///
/// Propagates errors from [`copy_file`] or [`copy_dir_recursive`].
pub fn copy_path(src: &Path, dst: &Path) -> Result<()> {
    if src.is_dir() {
        copy_dir_recursive(src, dst)
    } else {
        copy_file(src, dst)
    }
}

/// SHA-256 of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_digest(path: &Path) -> Result<[u8; 32]> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Sha256::digest(&bytes).into())
}

/// Whether `dst` already holds an identical copy of `src`: same kind, same
/// permission bits, same entry names and byte-identical files all the way
/// down.
///
/// Any read failure counts as "different".
#[must_use]
pub fn same_content(src: &Path, dst: &Path) -> bool {
    let (Ok(src_meta), Ok(dst_meta)) = (fs::metadata(src), fs::symlink_metadata(dst)) else {
        return false;
    };
    if dst_meta.is_symlink() {
        return false;
    }
    if src_meta.is_dir() != dst_meta.is_dir() || !same_permissions(&src_meta, &dst_meta) {
        return false;
    }
    if !src_meta.is_dir() {
        return src_meta.len() == dst_meta.len()
            && matches!((file_digest(src), file_digest(dst)), (Ok(a), Ok(b)) if a == b);
    }
    let (Ok(mut src_names), Ok(mut dst_names)) = (entry_names(src), entry_names(dst)) else {
        return false;
    };
    src_names.sort();
    dst_names.sort();
    src_names == dst_names
        && src_names
            .iter()
            .all(|name| same_content(&src.join(name), &dst.join(name)))
}

#[cfg(unix)]
fn same_permissions(a: &fs::Metadata, b: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    a.permissions().mode() & 0o7777 == b.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn same_permissions(a: &fs::Metadata, b: &fs::Metadata) -> bool {
    a.permissions().readonly() == b.permissions().readonly()
}

fn entry_names(dir: &Path) -> std::io::Result<Vec<std::ffi::OsString>> {
    fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn copies_files_and_subdirectories() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        fs::write(src.path().join("a.txt"), b"aaa").unwrap();
        fs::create_dir(src.path().join("sub")).unwrap();
        fs::write(src.path().join("sub/b.txt"), b"bbb").unwrap();

        let target = dst.path().join("out");
        copy_dir_recursive(src.path(), &target).unwrap();

        assert_eq!(fs::read(target.join("a.txt")).unwrap(), b"aaa");
        assert_eq!(fs::read(target.join("sub/b.txt")).unwrap(), b"bbb");
        assert!(same_content(src.path(), &target));
    }

    #[cfg(unix)]
    #[test]
    fn copy_preserves_permission_bits() {
        use std::os::unix::fs::PermissionsExt;
        let src = tempfile::tempdir().unwrap();
        let script = src.path().join("run.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o750)).unwrap();

        let dst = tempfile::tempdir().unwrap();
        let target = dst.path().join("tree");
        copy_dir_recursive(src.path(), &target).unwrap();

        let mode = fs::metadata(target.join("run.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[test]
    fn same_content_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, "one").unwrap();
        fs::write(&b, "one").unwrap();
        assert!(same_content(&a, &b));

        fs::write(&b, "two").unwrap();
        assert!(!same_content(&a, &b));
        assert!(!same_content(&a, &dir.path().join("missing")));
    }

    #[cfg(unix)]
    #[test]
    fn same_content_detects_mode_change() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, "one").unwrap();
        copy_file(&a, &b).unwrap();
        assert!(same_content(&a, &b));

        fs::set_permissions(&a, fs::Permissions::from_mode(0o755)).unwrap();
        fs::set_permissions(&b, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!same_content(&a, &b));
    }

    #[test]
    fn same_content_detects_extra_entries() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("a"), "x").unwrap();
        let dst = tempfile::tempdir().unwrap();
        let target = dst.path().join("t");
        copy_dir_recursive(src.path(), &target).unwrap();
        fs::write(target.join("extra"), "y").unwrap();
        assert!(!same_content(src.path(), &target));
    }

    #[test]
    fn remove_existing_handles_files_dirs_and_absent_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "x").unwrap();
        remove_existing(&file).unwrap();
        assert!(!file.exists());

        let sub = dir.path().join("d");
        fs::create_dir_all(sub.join("nested")).unwrap();
        fs::write(sub.join("nested/x"), "x").unwrap();
        remove_existing(&sub).unwrap();
        assert!(!sub.exists());

        remove_existing(&dir.path().join("never")).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn remove_existing_does_not_follow_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir(&real).unwrap();
        fs::write(real.join("keep"), "x").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        remove_existing(&link).unwrap();
        assert!(link.symlink_metadata().is_err());
        assert!(real.join("keep").exists());
    }

    #[test]
    fn ensure_parent_dir_creates_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/c.txt");
        ensure_parent_dir(&target).unwrap();
        assert!(dir.path().join("a/b").is_dir());
    }
}
