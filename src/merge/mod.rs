//! Merge engine: fold selected detected items into the manifest.
//!
//! List fields merge as an order-preserving union (existing entries first).
//! Scalar fields are overwritten. Missing objects are created on demand.
mod synthesize;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Result, bail};
use serde_json::{Map, Value, json};

use crate::detect::{ConfigFile, DetectedConfig, GitDetected, PromptInfo, SecretStore};
use crate::diff::{DiffItem, DiffResult};
use crate::error::ManifestError;
use crate::manifest::Manifest;
use crate::outcome::{Category, Outcome};
use crate::platform::EnvVars;

pub use synthesize::{MANIFEST_VERSION, create_default_manifest};

/// Items chosen for import, projected into manifest fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSelection {
    /// Added to `cli.tools`.
    pub cli_tools: Vec<String>,
    /// Added to `cli.custom`.
    pub cli_custom: Vec<String>,
    /// Replaces `shell.prompt`.
    pub shell_prompt: Option<PromptInfo>,
    /// Added to `shell.tools`.
    pub shell_tools: Vec<String>,
    /// Non-empty fields overwrite `git.*`.
    pub git: Option<GitDetected>,
    /// Replaces `editor.default` when set.
    pub editor: String,
    /// Added to `editor.others`.
    pub editor_others: Vec<String>,
    /// Replaces `terminal.font` when set.
    pub terminal_font: String,
    /// Added to `llm.providers`.
    pub llm_providers: Vec<String>,
    /// Replaces `llm.local.runtime` when set.
    pub llm_runtime: String,
    /// Added to `llm.local.models`.
    pub llm_models: Vec<String>,
    /// Added to `llm.coding.agents`.
    pub llm_agents: Vec<String>,
    /// Added to `secrets`.
    pub secrets: Vec<String>,
    /// Copied under the sync root.
    pub config_files: Vec<ConfigFile>,
}

impl ImportSelection {
    /// Whether nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Every local-only item of `modules` (all modules when empty), keyed by
/// module.
#[must_use]
pub fn select_local_only(diffs: &[DiffResult], modules: &[String]) -> BTreeMap<String, Vec<DiffItem>> {
    diffs
        .iter()
        .filter(|d| modules.is_empty() || modules.contains(&d.module))
        .filter(|d| !d.local_only.is_empty())
        .map(|d| (d.module.clone(), d.local_only.clone()))
        .collect()
}

fn names_of_kind(items: &[DiffItem], kind: &str) -> Vec<String> {
    items
        .iter()
        .filter(|i| i.kind == kind)
        .map(|i| i.name.clone())
        .collect()
}

fn git_selection(items: &[DiffItem]) -> GitDetected {
    let mut git = GitDetected::default();
    for item in items {
        let value = item
            .value
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match item.name.as_str() {
            "user" => git.user = value,
            "email" => git.email = value,
            "defaultBranch" => git.default_branch = value,
            "lfs" => git.lfs = true,
            _ => {}
        }
    }
    git
}

/// Project selected diff items (module name to items) onto an
/// [`ImportSelection`], taking prompt details and config file paths from
/// `detected`.
#[must_use]
pub fn build_selection_from_diffs(
    selected: &BTreeMap<String, Vec<DiffItem>>,
    detected: &DetectedConfig,
) -> ImportSelection {
    let items = |module: &str| selected.get(module).map_or(&[][..], Vec::as_slice);
    let first_of_kind = |module: &str, kind: &str| {
        names_of_kind(items(module), kind)
            .into_iter()
            .next()
            .unwrap_or_default()
    };

    let shell = items("shell");
    let shell_prompt = detected
        .shell
        .prompt
        .as_ref()
        .filter(|p| shell.iter().any(|i| i.kind == "prompt" && i.name == p.tool))
        .cloned();

    let files = items("files");
    let config_files = detected
        .config_files
        .iter()
        .filter(|cf| files.iter().any(|i| i.name == cf.name))
        .cloned()
        .collect();

    ImportSelection {
        cli_tools: names_of_kind(items("cli"), "tool"),
        cli_custom: names_of_kind(items("cli"), "custom"),
        shell_prompt,
        shell_tools: names_of_kind(shell, "tool"),
        git: selected.get("git").map(|items| git_selection(items)),
        editor: first_of_kind("editor", "editor"),
        editor_others: names_of_kind(items("editor"), "editor-other"),
        terminal_font: first_of_kind("terminal", "font"),
        llm_providers: names_of_kind(items("llm"), "provider"),
        llm_runtime: first_of_kind("llm", "runtime"),
        llm_models: names_of_kind(items("llm"), "model"),
        llm_agents: names_of_kind(items("llm"), "agent"),
        secrets: items("secrets").iter().map(|i| i.name.clone()).collect(),
        config_files,
    }
}

/// Order-preserving union of `existing` and `new`, dropping duplicates.
#[must_use]
pub fn merge_string_slices(existing: &[String], new: &[String]) -> Vec<String> {
    let mut merged = Vec::with_capacity(existing.len() + new.len());
    for s in existing.iter().chain(new) {
        if !merged.contains(s) {
            merged.push(s.clone());
        }
    }
    merged
}

/// Run `f` on the object under `key`, creating it (or replacing a
/// non-object value) first. The key keeps its position in `parent`.
pub fn with_object<R>(
    parent: &mut Map<String, Value>,
    key: &str,
    f: impl FnOnce(&mut Map<String, Value>) -> R,
) -> R {
    let slot = parent.entry(key.to_string()).or_insert(Value::Null);
    let mut map = match std::mem::take(slot) {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let result = f(&mut map);
    *slot = Value::Object(map);
    result
}

fn string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn union_into(map: &mut Map<String, Value>, key: &str, new: &[String]) {
    if new.is_empty() {
        return;
    }
    let merged = merge_string_slices(&string_list(map, key), new);
    map.insert(key.to_string(), json!(merged));
}

fn set_if_present(map: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        map.insert(key.to_string(), json!(value));
    }
}

pub(crate) fn prompt_value(prompt: &PromptInfo) -> Value {
    let mut map = Map::new();
    map.insert("tool".to_string(), json!(prompt.tool));
    set_if_present(&mut map, "theme", &prompt.theme);
    set_if_present(&mut map, "source", &prompt.source);
    Value::Object(map)
}

/// Fold `selection` into the document without touching the filesystem.
pub fn merge_document(doc: &mut Map<String, Value>, selection: &ImportSelection) {
    if !selection.cli_tools.is_empty() || !selection.cli_custom.is_empty() {
        with_object(doc, "cli", |cli| {
            union_into(cli, "tools", &selection.cli_tools);
            union_into(cli, "custom", &selection.cli_custom);
        });
    }

    if selection.shell_prompt.is_some() || !selection.shell_tools.is_empty() {
        with_object(doc, "shell", |shell| {
            if let Some(prompt) = &selection.shell_prompt {
                shell.insert("prompt".to_string(), prompt_value(prompt));
            }
            union_into(shell, "tools", &selection.shell_tools);
        });
    }

    if let Some(git) = &selection.git {
        with_object(doc, "git", |map| {
            set_if_present(map, "user", &git.user);
            set_if_present(map, "email", &git.email);
            set_if_present(map, "defaultBranch", &git.default_branch);
            if git.lfs {
                map.insert("lfs".to_string(), Value::Bool(true));
            }
        });
    }

    if !selection.editor.is_empty() || !selection.editor_others.is_empty() {
        with_object(doc, "editor", |editor| {
            set_if_present(editor, "default", &selection.editor);
            union_into(editor, "others", &selection.editor_others);
        });
    }

    if !selection.terminal_font.is_empty() {
        with_object(doc, "terminal", |terminal| {
            set_if_present(terminal, "font", &selection.terminal_font);
        });
    }

    merge_llm(doc, selection);

    if !selection.secrets.is_empty() {
        union_into(doc, "secrets", &selection.secrets);
    }
}

fn merge_llm(doc: &mut Map<String, Value>, selection: &ImportSelection) {
    let has_local = !selection.llm_runtime.is_empty() || !selection.llm_models.is_empty();
    if selection.llm_providers.is_empty() && !has_local && selection.llm_agents.is_empty() {
        return;
    }
    with_object(doc, "llm", |llm| {
        union_into(llm, "providers", &selection.llm_providers);
        if has_local {
            with_object(llm, "local", |local| {
                set_if_present(local, "runtime", &selection.llm_runtime);
                union_into(local, "models", &selection.llm_models);
            });
        }
        if !selection.llm_agents.is_empty() {
            with_object(llm, "coding", |coding| {
                union_into(coding, "agents", &selection.llm_agents);
            });
        }
    });
}

/// Target for a config file found at `source`: `~/`-relative when under
/// `home`.
fn file_target(source: &Path, home: &Path) -> String {
    source.strip_prefix(home).map_or_else(
        |_| source.to_string_lossy().into_owned(),
        |rel| format!("~/{}", rel.to_string_lossy().replace('\\', "/")),
    )
}

/// Copy each config file under the sync root and register it as a
/// `<module>.files.<name>` entry so the next sync links it back. A failed
/// copy is reported and leaves the manifest untouched for that file.
fn import_config_files(manifest: &mut Manifest, files: &[ConfigFile], home: &Path) -> Vec<Outcome> {
    let root = manifest.root().to_path_buf();
    files
        .iter()
        .map(|cf| match cf.copy_into(&root) {
            Ok(dest) => {
                let entry = json!({
                    "source": cf.dest_path,
                    "target": file_target(&cf.source_path, home),
                });
                with_object(manifest.document_mut(), &cf.module, |module| {
                    with_object(module, "files", |files| files.insert(cf.name.clone(), entry));
                });
                Outcome::ok(
                    Category::File,
                    &cf.module,
                    &cf.name,
                    format!("copied to {}", dest.display()),
                )
            }
            Err(e) => {
                tracing::warn!("skipping {}: {e:#}", cf.source_path.display());
                Outcome::fail(Category::File, &cf.module, &cf.name, format!("{e:#}"))
            }
        })
        .collect()
}

/// Fold `selection` into `manifest`, copy selected config files under the
/// sync root, and write the manifest back.
///
/// Returns one outcome per config file; a failed copy does not stop the
/// rest of the import.
///
/// # Errors
///
/// Returns an error only if the manifest cannot be written.
pub fn merge(
    selection: &ImportSelection,
    manifest: &mut Manifest,
    home: &Path,
) -> Result<Vec<Outcome>, ManifestError> {
    merge_document(manifest.document_mut(), selection);
    let outcomes = import_config_files(manifest, &selection.config_files, home);
    manifest.save()?;
    tracing::debug!("merged selection into {}", manifest.path().display());
    Ok(outcomes)
}

/// Check that the sync root exists and return the selected config files
/// whose source has vanished since the scan.
///
/// Vanished files do not fail validation: [`merge`] reports each one as a
/// failed outcome and imports the rest.
///
/// # Errors
///
/// Returns an error if the sync root is not a directory.
pub fn validate_selection<'a>(
    selection: &'a ImportSelection,
    root: &Path,
) -> Result<Vec<&'a ConfigFile>> {
    if !root.is_dir() {
        bail!("sync root does not exist: {}", root.display());
    }
    Ok(selection
        .config_files
        .iter()
        .filter(|cf| !cf.source_path.exists())
        .collect())
}

/// Copy the environment value of each selected secret into `store`.
/// Secrets without a value in `env` are skipped.
#[must_use]
pub fn store_secret_values(names: &[String], env: &EnvVars, store: &dyn SecretStore) -> Vec<Outcome> {
    names
        .iter()
        .map(|name| {
            let Some(value) = env.get(name) else {
                return Outcome::skip(Category::Configure, "secrets", name, "not set in environment");
            };
            match store.set(name, value) {
                Ok(()) => Outcome::ok(Category::Configure, "secrets", name, "stored"),
                Err(e) => Outcome::fail(Category::Configure, "secrets", name, format!("{e:#}")),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::detect::{CliDetected, MemorySecretStore, ShellDetected};
    use std::fs;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn union_keeps_order_and_drops_duplicates() {
        assert_eq!(
            merge_string_slices(&strings(&["git", "jq", "git"]), &strings(&["bat", "jq", "fd"])),
            strings(&["git", "jq", "bat", "fd"])
        );
    }

    #[test]
    fn existing_item_leaves_list_unchanged() {
        let mut doc = json!({ "cli": { "tools": ["git", "jq"] } });
        let selection = ImportSelection {
            cli_tools: strings(&["jq"]),
            ..ImportSelection::default()
        };
        merge_document(doc.as_object_mut().unwrap(), &selection);
        assert_eq!(doc["cli"]["tools"], json!(["git", "jq"]));
    }

    #[test]
    fn scalars_overwrite_and_objects_are_created() {
        let mut doc = json!({ "git": { "user": "old", "email": "keep@example.com" }, "shell": "bad" });
        let selection = ImportSelection {
            git: Some(GitDetected {
                user: "Ada".to_string(),
                lfs: true,
                ..GitDetected::default()
            }),
            shell_prompt: Some(PromptInfo {
                tool: "oh-my-posh".to_string(),
                theme: "atomic".to_string(),
                source: String::new(),
            }),
            llm_models: strings(&["llama3.2"]),
            llm_agents: strings(&["aider"]),
            ..ImportSelection::default()
        };
        merge_document(doc.as_object_mut().unwrap(), &selection);
        insta::assert_snapshot!(serde_json::to_string_pretty(&doc).unwrap(), @r#"
        {
          "git": {
            "user": "Ada",
            "email": "keep@example.com",
            "lfs": true
          },
          "shell": {
            "prompt": {
              "tool": "oh-my-posh",
              "theme": "atomic"
            }
          },
          "llm": {
            "local": {
              "models": [
                "llama3.2"
              ]
            },
            "coding": {
              "agents": [
                "aider"
              ]
            }
          }
        }
        "#);
    }

    #[test]
    fn selection_from_diff_items() {
        let detected = DetectedConfig {
            cli: CliDetected {
                tools: strings(&["lazygit"]),
                custom: strings(&["churn"]),
            },
            shell: ShellDetected {
                prompt: Some(PromptInfo {
                    tool: "starship".to_string(),
                    ..PromptInfo::default()
                }),
                ..ShellDetected::default()
            },
            ..DetectedConfig::default()
        };
        let mut selected = BTreeMap::new();
        selected.insert(
            "cli".to_string(),
            vec![DiffItem::new("lazygit", "tool"), DiffItem::new("churn", "custom")],
        );
        selected.insert("shell".to_string(), vec![DiffItem::new("starship", "prompt")]);
        selected.insert(
            "git".to_string(),
            vec![
                DiffItem::with_value("email", "setting", "ada@example.com"),
                DiffItem::with_value("lfs", "setting", true),
            ],
        );
        selected.insert(
            "editor".to_string(),
            vec![DiffItem::new("vim", "editor-other"), DiffItem::new("zed", "editor")],
        );

        let selection = build_selection_from_diffs(&selected, &detected);
        assert_eq!(selection.cli_tools, strings(&["lazygit"]));
        assert_eq!(selection.cli_custom, strings(&["churn"]));
        assert_eq!(selection.shell_prompt.unwrap().tool, "starship");
        let git = selection.git.unwrap();
        assert_eq!(git.email, "ada@example.com");
        assert!(git.user.is_empty());
        assert!(git.lfs);
        assert_eq!(selection.editor, "zed");
        assert_eq!(selection.editor_others, strings(&["vim"]));
        assert!(selection.config_files.is_empty());
    }

    #[test]
    fn merge_copies_files_and_registers_them() {
        let home = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        fs::write(home.path().join(".gitconfig"), "[user]\n\tname = Ada\n").unwrap();
        let selection = ImportSelection {
            config_files: vec![
                ConfigFile {
                    name: "gitconfig".to_string(),
                    source_path: home.path().join(".gitconfig"),
                    dest_path: "git/gitconfig".to_string(),
                    module: "git".to_string(),
                    is_dir: false,
                },
                ConfigFile {
                    name: "zshrc".to_string(),
                    source_path: home.path().join(".zshrc"),
                    dest_path: "shell/zshrc".to_string(),
                    module: "shell".to_string(),
                    is_dir: false,
                },
            ],
            ..ImportSelection::default()
        };
        let mut manifest = Manifest::from_value(root.path(), json!({ "name": "ada" })).unwrap();

        let outcomes = merge(&selection, &mut manifest, home.path()).unwrap();
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert_eq!(
            fs::read_to_string(root.path().join("git/gitconfig")).unwrap(),
            "[user]\n\tname = Ada\n"
        );
        let saved = Manifest::load(root.path()).unwrap();
        assert_eq!(saved.get_str("git.files.gitconfig.source"), "git/gitconfig");
        assert_eq!(saved.get_str("git.files.gitconfig.target"), "~/.gitconfig");
        assert!(!saved.has_key("shell"));
    }

    #[test]
    fn validation_lists_vanished_files_without_failing() {
        let root = tempfile::tempdir().unwrap();
        let mut selection = ImportSelection::default();
        assert!(validate_selection(&selection, root.path()).unwrap().is_empty());
        assert!(validate_selection(&selection, &root.path().join("absent")).is_err());

        selection.config_files.push(ConfigFile {
            name: "zshrc".to_string(),
            source_path: root.path().join(".zshrc"),
            dest_path: "shell/zshrc".to_string(),
            module: "shell".to_string(),
            is_dir: false,
        });
        let vanished = validate_selection(&selection, root.path()).unwrap();
        assert_eq!(vanished.len(), 1);
        assert_eq!(vanished[0].name, "zshrc");
    }

    #[test]
    fn secret_values_go_to_the_store() {
        let store = MemorySecretStore::new();
        let env = EnvVars::default().with("OPENAI_API_KEY", "sk-live");
        let outcomes = store_secret_values(&strings(&["OPENAI_API_KEY", "GROQ_API_KEY"]), &env, &store);
        assert_eq!(outcomes[0].message, "stored");
        assert!(outcomes[1].skipped);
        assert_eq!(store.get("OPENAI_API_KEY").unwrap().as_deref(), Some("sk-live"));
        assert!(!store.has("GROQ_API_KEY"));
    }
}
