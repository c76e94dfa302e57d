//! A fresh manifest built from a full detection.
use std::path::Path;

use serde_json::{Map, Value, json};

use super::prompt_value;
use crate::detect::DetectedConfig;
use crate::manifest::Manifest;

/// Manifest version written into new manifests.
pub const MANIFEST_VERSION: &str = "1.0.0";

fn insert_list(map: &mut Map<String, Value>, key: &str, items: &[String]) {
    if !items.is_empty() {
        map.insert(key.to_string(), json!(items));
    }
}

fn insert_object(doc: &mut Map<String, Value>, key: &str, map: Map<String, Value>) {
    if !map.is_empty() {
        doc.insert(key.to_string(), Value::Object(map));
    }
}

/// Build a manifest for `root` from everything in `detected`, owned by
/// `username`. Secrets are recorded by name only. Git settings are only
/// written when a user name or email is known.
#[must_use]
pub fn create_default_manifest(detected: &DetectedConfig, username: &str, root: &Path) -> Manifest {
    let mut doc = Map::new();
    doc.insert("name".to_string(), json!(username));
    doc.insert("version".to_string(), json!(MANIFEST_VERSION));

    let mut cli = Map::new();
    insert_list(&mut cli, "tools", &detected.cli.tools);
    insert_list(&mut cli, "custom", &detected.cli.custom);
    insert_object(&mut doc, "cli", cli);

    let mut shell = Map::new();
    if let Some(prompt) = &detected.shell.prompt {
        shell.insert("prompt".to_string(), prompt_value(prompt));
    }
    insert_list(&mut shell, "tools", &detected.shell.tools);
    insert_object(&mut doc, "shell", shell);

    let git = &detected.git;
    if !git.user.is_empty() || !git.email.is_empty() {
        let mut map = Map::new();
        for (key, value) in [
            ("user", &git.user),
            ("email", &git.email),
            ("defaultBranch", &git.default_branch),
        ] {
            if !value.is_empty() {
                map.insert(key.to_string(), json!(value));
            }
        }
        if git.lfs {
            map.insert("lfs".to_string(), Value::Bool(true));
        }
        doc.insert("git".to_string(), Value::Object(map));
    }

    if !detected.editor.default.is_empty() {
        doc.insert("editor".to_string(), json!({ "default": detected.editor.default }));
    }
    if !detected.terminal.font.is_empty() {
        doc.insert("terminal".to_string(), json!({ "font": detected.terminal.font }));
    }

    let llm = &detected.llm;
    let mut llm_map = Map::new();
    insert_list(&mut llm_map, "providers", &llm.providers);
    if let Some(local) = &llm.local {
        let mut local_map = Map::new();
        local_map.insert("runtime".to_string(), json!(local.runtime));
        insert_list(&mut local_map, "models", &local.models);
        llm_map.insert("local".to_string(), Value::Object(local_map));
    }
    if !llm.agents.is_empty() {
        llm_map.insert("coding".to_string(), json!({ "agents": llm.agents }));
    }
    insert_object(&mut doc, "llm", llm_map);

    let secrets: Vec<String> = detected.secrets.iter().map(|s| s.name.clone()).collect();
    insert_list(&mut doc, "secrets", &secrets);

    let mut manifest = Manifest::new(root);
    *manifest.document_mut() = doc;
    manifest
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::detect::{
        CliDetected, EditorDetected, GitDetected, LlmDetected, LocalLlm, PromptInfo,
        SecretDetected, ShellDetected,
    };

    #[test]
    fn full_detection_becomes_manifest() {
        let detected = DetectedConfig {
            cli: CliDetected {
                tools: vec!["git".to_string(), "jq".to_string()],
                custom: Vec::new(),
            },
            shell: ShellDetected {
                kind: "zsh".to_string(),
                prompt: Some(PromptInfo {
                    tool: "oh-my-posh".to_string(),
                    theme: "atomic".to_string(),
                    source: String::new(),
                }),
                tools: Vec::new(),
            },
            git: GitDetected {
                user: "Ada".to_string(),
                email: String::new(),
                default_branch: "main".to_string(),
                lfs: false,
            },
            editor: EditorDetected {
                default: "neovim".to_string(),
                others: vec!["vim".to_string()],
            },
            llm: LlmDetected {
                providers: Vec::new(),
                local: Some(LocalLlm {
                    runtime: "ollama".to_string(),
                    models: Vec::new(),
                }),
                agents: Vec::new(),
            },
            secrets: vec![SecretDetected {
                name: "OPENAI_API_KEY".to_string(),
                in_env: true,
                ..SecretDetected::default()
            }],
            ..DetectedConfig::default()
        };
        let m = create_default_manifest(&detected, "ada", Path::new("/home/ada/.pact"));
        insta::assert_snapshot!(serde_json::to_string_pretty(m.document()).unwrap(), @r#"
        {
          "name": "ada",
          "version": "1.0.0",
          "cli": {
            "tools": [
              "git",
              "jq"
            ]
          },
          "shell": {
            "prompt": {
              "tool": "oh-my-posh",
              "theme": "atomic"
            }
          },
          "git": {
            "user": "Ada",
            "defaultBranch": "main"
          },
          "editor": {
            "default": "neovim"
          },
          "llm": {
            "local": {
              "runtime": "ollama"
            }
          },
          "secrets": [
            "OPENAI_API_KEY"
          ]
        }
        "#);
    }

    #[test]
    fn git_needs_an_identity() {
        let detected = DetectedConfig {
            git: GitDetected {
                default_branch: "main".to_string(),
                lfs: true,
                ..GitDetected::default()
            },
            ..DetectedConfig::default()
        };
        let m = create_default_manifest(&detected, "ada", Path::new("/tmp/.pact"));
        assert!(!m.has_key("git"));
        assert_eq!(m.top_level_keys(), vec!["name", "version"]);
    }
}
