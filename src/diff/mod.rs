//! Diff engine: classify detected state against the manifest.
//!
//! Every (name, type) pair seen on either side lands in exactly one of
//! [`DiffResult::local_only`], [`DiffResult::pact_only`] or
//! [`DiffResult::synced`]. A scalar setting whose detected value differs
//! from the manifest is local-only: importing it overwrites the manifest.
use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::detect::DetectedConfig;
use crate::manifest::Manifest;

/// One classified item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffItem {
    /// Item name: a tool, a setting key, an editor, a secret name, ...
    pub name: String,
    /// Disambiguates same-named items: `tool`, `custom`, `prompt`,
    /// `setting`, `editor`, `editor-other`, `font`, `provider`, `runtime`,
    /// `model`, `agent`, `secret`, `config`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Setting value, prompt theme, or config file path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl DiffItem {
    /// Item without a value.
    #[must_use]
    pub fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            value: None,
        }
    }

    /// Item carrying `value`.
    #[must_use]
    pub fn with_value(name: &str, kind: &str, value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::new(name, kind)
        }
    }
}

/// Classification of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    /// Module name.
    pub module: String,
    /// Detected on this machine, absent from (or different in) the manifest.
    pub local_only: Vec<DiffItem>,
    /// In the manifest, not detected.
    pub pact_only: Vec<DiffItem>,
    /// Present on both sides.
    pub synced: Vec<DiffItem>,
}

impl DiffResult {
    fn new(module: &str) -> Self {
        Self {
            module: module.to_string(),
            ..Self::default()
        }
    }

    /// Whether no item was classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local_only.is_empty() && self.pact_only.is_empty() && self.synced.is_empty()
    }

    /// Classify two name lists: detected names first, in detection order,
    /// then manifest names that were not detected. Repeated names on either
    /// side are classified once.
    fn lists(&mut self, kind: &str, detected: &[String], declared: &[String]) {
        let mut seen = HashSet::new();
        for name in detected.iter().filter(|name| seen.insert(name.as_str())) {
            let item = DiffItem::new(name, kind);
            if declared.contains(name) {
                self.synced.push(item);
            } else {
                self.local_only.push(item);
            }
        }
        self.pact_only.extend(
            declared
                .iter()
                .filter(|name| seen.insert(name.as_str()))
                .map(|name| DiffItem::new(name, kind)),
        );
    }

    /// A named setting with one value per side, e.g. `git.user`.
    fn setting(&mut self, name: &str, detected: &str, declared: &str) {
        if !detected.is_empty() {
            let item = DiffItem::with_value(name, "setting", detected);
            if detected == declared {
                self.synced.push(item);
            } else {
                self.local_only.push(item);
            }
        } else if !declared.is_empty() {
            self.pact_only.push(DiffItem::with_value(name, "setting", declared));
        }
    }

    /// A single choice named by its value, e.g. the default editor. A
    /// mismatch yields two items: the detected one local-only and the
    /// declared one pact-only.
    fn choice(&mut self, kind: &str, detected: &str, declared: &str) {
        if !detected.is_empty() {
            let item = DiffItem::new(detected, kind);
            if detected == declared {
                self.synced.push(item);
                return;
            }
            self.local_only.push(item);
        }
        if !declared.is_empty() {
            self.pact_only.push(DiffItem::new(declared, kind));
        }
    }
}

fn compare_cli(detected: &DetectedConfig, manifest: &Manifest) -> DiffResult {
    let mut result = DiffResult::new("cli");
    result.lists("tool", &detected.cli.tools, &manifest.get_string_slice("cli.tools"));
    result.lists("custom", &detected.cli.custom, &manifest.get_string_slice("cli.custom"));
    result
}

fn compare_shell(detected: &DetectedConfig, manifest: &Manifest) -> DiffResult {
    let mut result = DiffResult::new("shell");
    let declared = manifest.get_str("shell.prompt.tool");
    if let Some(prompt) = &detected.shell.prompt {
        let item = if prompt.theme.is_empty() {
            DiffItem::new(&prompt.tool, "prompt")
        } else {
            DiffItem::with_value(&prompt.tool, "prompt", prompt.theme.as_str())
        };
        if prompt.tool == declared {
            result.synced.push(item);
        } else {
            result.local_only.push(item);
        }
    }
    let detected_tool = detected.shell.prompt.as_ref().map(|p| p.tool.as_str());
    if !declared.is_empty() && detected_tool != Some(declared) {
        result.pact_only.push(DiffItem::new(declared, "prompt"));
    }
    result.lists("tool", &detected.shell.tools, &manifest.get_string_slice("shell.tools"));
    result
}

fn compare_git(detected: &DetectedConfig, manifest: &Manifest) -> DiffResult {
    let mut result = DiffResult::new("git");
    let git = &detected.git;
    result.setting("user", &git.user, manifest.get_str("git.user"));
    result.setting("email", &git.email, manifest.get_str("git.email"));
    result.setting(
        "defaultBranch",
        &git.default_branch,
        manifest.get_str("git.defaultBranch"),
    );
    let declared_lfs = manifest.get_bool("git.lfs");
    let lfs = DiffItem::with_value("lfs", "setting", true);
    match (git.lfs, declared_lfs) {
        (true, true) => result.synced.push(lfs),
        (true, false) => result.local_only.push(lfs),
        (false, true) => result.pact_only.push(lfs),
        (false, false) => {}
    }
    result
}

fn compare_editor(detected: &DetectedConfig, manifest: &Manifest) -> DiffResult {
    let mut result = DiffResult::new("editor");
    let declared_default = manifest.get_str("editor.default");
    result.choice("editor", &detected.editor.default, declared_default);

    // An installed editor the manifest already names as its default counts
    // as known.
    let mut declared_others = manifest.get_string_slice("editor.others");
    if !declared_default.is_empty()
        && detected.editor.others.iter().any(|e| e == declared_default)
        && !declared_others.iter().any(|e| e == declared_default)
    {
        declared_others.push(declared_default.to_string());
    }
    result.lists("editor-other", &detected.editor.others, &declared_others);
    result
}

fn compare_terminal(detected: &DetectedConfig, manifest: &Manifest) -> DiffResult {
    let mut result = DiffResult::new("terminal");
    result.choice("font", &detected.terminal.font, manifest.get_str("terminal.font"));
    result
}

fn compare_llm(detected: &DetectedConfig, manifest: &Manifest) -> DiffResult {
    let mut result = DiffResult::new("llm");
    let llm = &detected.llm;
    result.lists("provider", &llm.providers, &manifest.get_string_slice("llm.providers"));

    let (runtime, models) = llm
        .local
        .as_ref()
        .map_or(("", &[][..]), |local| (local.runtime.as_str(), local.models.as_slice()));
    result.choice("runtime", runtime, manifest.get_str("llm.local.runtime"));
    result.lists("model", models, &manifest.get_string_slice("llm.local.models"));
    result.lists("agent", &llm.agents, &manifest.get_string_slice("llm.coding.agents"));
    result
}

fn compare_secrets(detected: &DetectedConfig, manifest: &Manifest) -> DiffResult {
    let mut result = DiffResult::new("secrets");
    let names: Vec<String> = detected.secrets.iter().map(|s| s.name.clone()).collect();
    result.lists("secret", &names, &manifest.secrets());
    result
}

fn compare_config_files(detected: &DetectedConfig) -> DiffResult {
    let mut result = DiffResult::new("files");
    result.local_only = detected
        .config_files
        .iter()
        .map(|cf| {
            DiffItem::with_value(&cf.name, "config", cf.source_path.to_string_lossy().as_ref())
        })
        .collect();
    result
}

/// Classify `detected` against `manifest`, one result per module in the
/// order cli, shell, git, editor, terminal, llm, secrets, files. Modules
/// with nothing to report are left out.
#[must_use]
pub fn compare(detected: &DetectedConfig, manifest: &Manifest) -> Vec<DiffResult> {
    let results = [
        compare_cli(detected, manifest),
        compare_shell(detected, manifest),
        compare_git(detected, manifest),
        compare_editor(detected, manifest),
        compare_terminal(detected, manifest),
        compare_llm(detected, manifest),
        compare_secrets(detected, manifest),
        compare_config_files(detected),
    ];
    results.into_iter().filter(|r| !r.is_empty()).collect()
}

/// Local-only items across all modules.
#[must_use]
pub fn count_new_items(diffs: &[DiffResult]) -> usize {
    diffs.iter().map(|d| d.local_only.len()).sum()
}

/// Pact-only items across all modules.
#[must_use]
pub fn count_missing_items(diffs: &[DiffResult]) -> usize {
    diffs.iter().map(|d| d.pact_only.len()).sum()
}
