// Shared helpers for integration tests.
//
// Provides a temporary home directory holding a `.pact/` sync root, a
// manifest writer, and test doubles for subprocesses and downloads so each
// integration test runs in isolation without touching the real machine.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pact_cli::exec::{ExecResult, Executor};
use pact_cli::manifest::Manifest;
use pact_cli::resources::download::{Downloader, Release};
use serde_json::Value;
use tempfile::TempDir;

/// A temporary home directory with an empty `.pact/` sync root inside it.
#[derive(Debug)]
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join(".pact")).expect("create sync root");
        Self { dir }
    }

    /// The fake home directory.
    pub fn home(&self) -> &Path {
        self.dir.path()
    }

    /// The sync root, `<home>/.pact`.
    pub fn root(&self) -> PathBuf {
        self.dir.path().join(".pact")
    }

    /// Write `content` to `rel` under the sync root, creating parents.
    pub fn write_source(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        std::fs::create_dir_all(path.parent().expect("source has a parent"))
            .expect("create source dir");
        std::fs::write(&path, content).expect("write source");
        path
    }

    /// Write `content` to `rel` under the home directory, creating parents.
    pub fn write_home_file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.home().join(rel);
        std::fs::create_dir_all(path.parent().expect("file has a parent"))
            .expect("create home dir");
        std::fs::write(&path, content).expect("write home file");
        path
    }

    /// Save `doc` as the manifest and load it back from disk.
    pub fn write_manifest(&self, doc: Value) -> Manifest {
        Manifest::from_value(self.root(), doc)
            .expect("manifest is an object")
            .save()
            .expect("save manifest");
        Manifest::load(&self.root()).expect("load manifest")
    }
}

/// Executor that answers `PATH` lookups from a fixed set and records every
/// command it is asked to run. Every run succeeds with empty output.
#[derive(Debug, Default)]
pub struct PathExecutor {
    on_path: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl PathExecutor {
    pub fn with_programs(programs: &[&str]) -> Self {
        Self {
            on_path: programs.iter().map(|p| (*p).to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every command line run so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl Executor for PathExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.run_unchecked(program, args)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let mut line = vec![program];
        line.extend_from_slice(args);
        self.calls.lock().expect("calls lock").push(line.join(" "));
        Ok(ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        })
    }

    fn which(&self, program: &str) -> bool {
        self.on_path.contains(program)
    }
}

/// Executor that keeps just enough machine state for apply to observe its
/// own changes: package installs put the package on `PATH`, and
/// `git config --global` reads back what was written. `git lfs install`
/// registers the LFS clean filter. Anything else succeeds silently.
#[derive(Debug, Default)]
pub struct FakeMachine {
    on_path: Mutex<HashSet<String>>,
    git_config: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeMachine {
    /// Every command line run so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Global git config as written so far.
    pub fn git_value(&self, key: &str) -> Option<String> {
        self.git_config.lock().expect("git lock").get(key).cloned()
    }

    fn answer(&self, program: &str, args: &[&str]) -> (bool, String) {
        match (program, args) {
            ("git", ["config", "--global", "--get", key]) => self
                .git_value(key)
                .map_or((false, String::new()), |v| (true, format!("{v}\n"))),
            ("git", ["config", "--global", key, value]) => {
                self.set_git(key, value);
                (true, String::new())
            }
            ("git", ["lfs", "install"]) => {
                self.set_git("filter.lfs.clean", "git-lfs clean -- %f");
                (true, String::new())
            }
            ("sudo", ["apt", "install", "-y", package]) => {
                self.on_path
                    .lock()
                    .expect("path lock")
                    .insert((*package).to_string());
                (true, String::new())
            }
            _ => (true, String::new()),
        }
    }

    fn set_git(&self, key: &str, value: &str) {
        self.git_config
            .lock()
            .expect("git lock")
            .insert(key.to_string(), value.to_string());
    }
}

impl Executor for FakeMachine {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let result = self.run_unchecked(program, args)?;
        if !result.success {
            anyhow::bail!("{program} failed");
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let mut line = vec![program];
        line.extend_from_slice(args);
        self.calls.lock().expect("calls lock").push(line.join(" "));
        let (success, stdout) = self.answer(program, args);
        Ok(ExecResult {
            stdout,
            stderr: String::new(),
            success,
            code: Some(i32::from(!success)),
        })
    }

    fn which(&self, program: &str) -> bool {
        self.on_path.lock().expect("path lock").contains(program)
    }
}

/// Downloader that fails every request. Tests using it must not need the
/// network.
#[derive(Debug, Default)]
pub struct OfflineDownloader;

impl Downloader for OfflineDownloader {
    fn latest_release(&self, repo: &str) -> anyhow::Result<Release> {
        anyhow::bail!("offline: no release lookup for {repo}")
    }

    fn download(&self, url: &str, _dest: &Path) -> anyhow::Result<()> {
        anyhow::bail!("offline: cannot download {url}")
    }
}
