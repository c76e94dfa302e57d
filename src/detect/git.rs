//! Global git settings.
use super::GitDetected;
use crate::exec::Executor;
use crate::resources::git_config::read_global;

/// Read `user.name`, `user.email`, `init.defaultBranch` and whether Git
/// LFS runs. Unset keys come back empty.
#[must_use]
pub fn detect_git(executor: &dyn Executor) -> GitDetected {
    let get = |key: &str| read_global(key, executor).unwrap_or_default();
    GitDetected {
        user: get("user.name"),
        email: get("user.email"),
        default_branch: get("init.defaultBranch"),
        lfs: executor.which("git-lfs")
            && executor
                .run_unchecked("git", &["lfs", "version"])
                .is_ok_and(|r| r.success),
    }
}
