//! Detection engine: read-only scanners for the live machine.
//!
//! Every scanner degrades to an empty result when a command is missing or
//! a file is unreadable; a scan never fails as a whole. Scanners read the
//! environment through [`EnvVars`] and run programs through [`Executor`],
//! so tests drive them with fixed inputs.
mod configs;
mod editor;
mod git;
mod llm;
mod secrets;
mod shell;
mod terminal;
mod tools;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::exec::Executor;
use crate::platform::{EnvVars, Platform};

pub use configs::{ConfigFile, ConfigLocation, config_locations, discover_config_files};
pub use editor::{KNOWN_EDITORS, detect_editor, normalize_editor_name};
pub use git::detect_git;
pub use llm::{KNOWN_CODING_AGENTS, LLM_PROVIDER_KEYS, detect_llm, parse_ollama_list};
pub use secrets::{COMMON_SECRETS, MemorySecretStore, SecretStore, detect_secrets, is_secret_name};
pub use shell::{detect_shell, detect_shell_type, parse_prompt_theme};
pub use terminal::{detect_terminal, parse_font_family};
pub use tools::{KNOWN_CLI_TOOLS, KNOWN_CUSTOM_TOOLS, KNOWN_PROMPT_TOOLS, KNOWN_SHELL_TOOLS, detect_cli};

/// Modules scanned when [`ScanOptions::modules`] is empty.
pub const DEFAULT_MODULES: [&str; 7] = ["cli", "shell", "git", "editor", "terminal", "llm", "secrets"];

/// Installed command-line tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CliDetected {
    /// Tools from the package-manager list found on `PATH`.
    pub tools: Vec<String>,
    /// Tools distributed as GitHub releases found on `PATH`.
    pub custom: Vec<String>,
}

/// Prompt tool and theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PromptInfo {
    /// `oh-my-posh` or `starship`.
    pub tool: String,
    /// Theme name, without the `.omp.json` suffix.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub theme: String,
    /// Theme URL when the shell config loads it remotely.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
}

/// Shell type, prompt, and shell helper tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShellDetected {
    /// `zsh`, `bash`, `fish`, `powershell`, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Installed prompt tool, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<PromptInfo>,
    /// Shell helper tools found on `PATH`.
    pub tools: Vec<String>,
}

/// Global git settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitDetected {
    /// `user.name`.
    pub user: String,
    /// `user.email`.
    pub email: String,
    /// `init.defaultBranch`.
    pub default_branch: String,
    /// Whether Git LFS is installed and working.
    pub lfs: bool,
}

/// Default and other installed editors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditorDetected {
    /// `$EDITOR`/`$VISUAL`, or the first installed editor.
    pub default: String,
    /// Other installed editors, in preference order.
    pub others: Vec<String>,
}

/// Terminal font.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TerminalDetected {
    /// Font family from the first terminal config that names one.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub font: String,
}

/// Local model runtime and its pulled models.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalLlm {
    /// Runtime binary, e.g. `ollama`.
    pub runtime: String,
    /// Pulled model names without tags.
    pub models: Vec<String>,
}

/// LLM providers, local runtime, and coding agents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LlmDetected {
    /// Providers with an API key in the environment.
    pub providers: Vec<String>,
    /// Local runtime, if installed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalLlm>,
    /// Coding agents found on `PATH`.
    pub agents: Vec<String>,
}

/// A secret name and where it is available. Values are never read into
/// this record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretDetected {
    /// Environment variable name.
    pub name: String,
    /// Set in the environment.
    pub in_env: bool,
    /// Stored in the secret store.
    pub in_keychain: bool,
    /// Listed under `secrets` in the manifest.
    pub in_manifest: bool,
}

/// Everything found on the machine by one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedConfig {
    /// Command-line tools.
    pub cli: CliDetected,
    /// Shell setup.
    pub shell: ShellDetected,
    /// Git settings.
    pub git: GitDetected,
    /// Editors.
    pub editor: EditorDetected,
    /// Terminal.
    pub terminal: TerminalDetected,
    /// LLM tooling.
    pub llm: LlmDetected,
    /// Secrets in the environment.
    pub secrets: Vec<SecretDetected>,
    /// Config files found at known locations.
    pub config_files: Vec<ConfigFile>,
}

/// Which scanners to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Modules to scan; empty scans [`DEFAULT_MODULES`] and config files.
    pub modules: Vec<String>,
    /// Also discover config files, limited to the selected modules.
    pub include_files: bool,
}

impl ScanOptions {
    /// Scan everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Scan only `modules`, optionally with their config files.
    #[must_use]
    pub fn modules(modules: &[&str], include_files: bool) -> Self {
        Self {
            modules: modules.iter().map(|m| (*m).to_string()).collect(),
            include_files,
        }
    }

    fn wants(&self, module: &str) -> bool {
        if self.modules.is_empty() {
            DEFAULT_MODULES.contains(&module)
        } else {
            self.modules.iter().any(|m| m == module)
        }
    }
}

/// Runs the scanners against one machine.
pub struct Scanner<'a> {
    platform: Platform,
    home: PathBuf,
    env: &'a EnvVars,
    executor: &'a dyn Executor,
    secret_store: Option<&'a dyn SecretStore>,
}

impl std::fmt::Debug for Scanner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("platform", &self.platform)
            .field("home", &self.home)
            .field("secret_store", &self.secret_store.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> Scanner<'a> {
    /// Create a scanner for `home` on `platform`.
    #[must_use]
    pub fn new(
        platform: Platform,
        home: &Path,
        env: &'a EnvVars,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            platform,
            home: home.to_path_buf(),
            env,
            executor,
            secret_store: None,
        }
    }

    /// Consult `store` to fill [`SecretDetected::in_keychain`].
    #[must_use]
    pub fn with_secret_store(mut self, store: &'a dyn SecretStore) -> Self {
        self.secret_store = Some(store);
        self
    }

    /// Run the scanners selected by `opts`. `manifest_secrets` marks
    /// secrets already listed in the manifest.
    #[must_use]
    pub fn scan(&self, opts: &ScanOptions, manifest_secrets: &[String]) -> DetectedConfig {
        let mut detected = DetectedConfig::default();
        if opts.wants("cli") {
            detected.cli = detect_cli(self.executor);
        }
        if opts.wants("shell") {
            detected.shell = detect_shell(self.platform, &self.home, self.env, self.executor);
        }
        if opts.wants("git") {
            detected.git = detect_git(self.executor);
        }
        if opts.wants("editor") {
            detected.editor = detect_editor(self.env, self.executor);
        }
        if opts.wants("terminal") {
            detected.terminal = detect_terminal(self.platform.os, &self.home);
        }
        if opts.wants("llm") {
            detected.llm = detect_llm(self.env, self.executor);
        }
        if opts.wants("secrets") {
            detected.secrets = detect_secrets(self.env, manifest_secrets, self.secret_store);
        }

        if opts.modules.is_empty() {
            detected.config_files = discover_config_files(self.platform.os, &self.home);
        } else if opts.include_files {
            detected.config_files = discover_config_files(self.platform.os, &self.home)
                .into_iter()
                .filter(|cf| opts.modules.contains(&cf.module))
                .collect();
        }
        tracing::debug!(
            "scan found {} tools, {} secrets, {} config files",
            detected.cli.tools.len(),
            detected.secrets.len(),
            detected.config_files.len()
        );
        detected
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Os};
    use crate::resources::test_helpers::MockExecutor;
    use std::fs;

    #[test]
    fn module_selection_limits_scanners_and_files() {
        let home = tempfile::tempdir().unwrap();
        fs::write(home.path().join(".zshrc"), "").unwrap();
        fs::write(home.path().join(".gitconfig"), "").unwrap();
        let env = EnvVars::default().with("OPENAI_API_KEY", "sk-test");
        let exec = MockExecutor::new().on_path(&["jq", "git"]);
        let scanner = Scanner::new(Platform::new(Os::Linux, Arch::Amd64), home.path(), &env, &exec);

        let only_cli = scanner.scan(&ScanOptions::modules(&["cli"], false), &[]);
        assert_eq!(only_cli.cli.tools, vec!["git", "jq"]);
        assert!(only_cli.llm.providers.is_empty());
        assert!(only_cli.config_files.is_empty());

        let shell = scanner.scan(&ScanOptions::modules(&["shell"], true), &[]);
        let names: Vec<_> = shell.config_files.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zshrc"]);
    }

    #[test]
    fn full_scan_includes_files_and_secrets() {
        let home = tempfile::tempdir().unwrap();
        fs::write(home.path().join(".gitconfig"), "").unwrap();
        let env = EnvVars::default().with("OPENAI_API_KEY", "sk-test");
        let exec = MockExecutor::new();
        let scanner = Scanner::new(Platform::new(Os::Linux, Arch::Amd64), home.path(), &env, &exec);

        let all = scanner.scan(&ScanOptions::all(), &["OPENAI_API_KEY".to_string()]);
        assert_eq!(all.llm.providers, vec!["openai"]);
        assert_eq!(all.secrets.len(), 1);
        assert!(all.secrets[0].in_manifest);
        assert_eq!(all.config_files.len(), 1);
        assert_eq!(all.config_files[0].module, "git");
    }

    #[test]
    fn detected_config_serializes_camel_case() {
        let detected = DetectedConfig {
            git: GitDetected {
                default_branch: "main".to_string(),
                ..GitDetected::default()
            },
            ..DetectedConfig::default()
        };
        let json = serde_json::to_value(&detected).unwrap();
        assert_eq!(json["git"]["defaultBranch"], "main");
        assert_eq!(json["shell"]["type"], "");
        assert!(json.get("configFiles").is_some());
    }
}
