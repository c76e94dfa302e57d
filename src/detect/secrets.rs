//! Secret names in the environment, and the store secret values live in.
use std::collections::{BTreeMap, HashSet};
use std::sync::{LazyLock, Mutex};

use anyhow::Result;
use regex::Regex;

use super::SecretDetected;
use crate::platform::EnvVars;

/// Secret names looked for before pattern matching.
pub const COMMON_SECRETS: &[&str] = &[
    "ANTHROPIC_API_KEY",
    "OPENAI_API_KEY",
    "GEMINI_API_KEY",
    "GROQ_API_KEY",
    "XAI_API_KEY",
    "REPLICATE_API_TOKEN",
    "HUGGING_FACE_TOKEN",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
];

/// Tokens pact and the GitHub CLI use themselves.
const SKIPPED: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

static SECRET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"_API_KEY$",
        r"_SECRET_KEY$",
        r"_ACCESS_KEY$",
        r"_TOKEN$",
        r"^ANTHROPIC_",
        r"^OPENAI_",
        r"^GEMINI_",
        r"^GROQ_",
        r"^REPLICATE_",
        r"^XAI_",
        r"^HUGGING_FACE_",
        r"^HF_",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Whether an environment variable name looks like a credential.
#[must_use]
pub fn is_secret_name(name: &str) -> bool {
    !SKIPPED.contains(&name)
        && (COMMON_SECRETS.contains(&name) || SECRET_PATTERNS.iter().any(|re| re.is_match(name)))
}

/// Key/value storage for secret values, such as an OS keychain.
///
/// Values never enter the manifest; it only lists secret names.
#[cfg_attr(test, mockall::automock)]
pub trait SecretStore {
    /// Value stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Store `value` under `name`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set(&self, name: &str, value: &str) -> Result<()>;

    /// Whether a value is stored under `name`.
    fn has(&self, name: &str) -> bool;

    /// Remove the value stored under `name`; absent names are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn delete(&self, name: &str) -> Result<()>;
}

/// Process-local [`SecretStore`].
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySecretStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("secret store lock poisoned"))
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(name).cloned())
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        self.lock()?.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn has(&self, name: &str) -> bool {
        self.lock().is_ok_and(|values| values.contains_key(name))
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.lock()?.remove(name);
        Ok(())
    }
}

/// Secrets available on this machine.
///
/// Common names come first, then other credential-like variables in name
/// order, then manifest secrets that are only in `store`.
#[must_use]
pub fn detect_secrets(
    env: &EnvVars,
    manifest_secrets: &[String],
    store: Option<&dyn SecretStore>,
) -> Vec<SecretDetected> {
    let in_store = |name: &str| store.is_some_and(|s| s.has(name));
    let in_manifest = |name: &str| manifest_secrets.iter().any(|s| s == name);
    let mut seen = HashSet::new();
    let mut detected = Vec::new();

    let from_env = COMMON_SECRETS
        .iter()
        .copied()
        .filter(|name| env.is_set(name))
        .chain(env.names().filter(|name| is_secret_name(name)));
    for name in from_env {
        if SKIPPED.contains(&name) || !seen.insert(name.to_string()) {
            continue;
        }
        detected.push(SecretDetected {
            name: name.to_string(),
            in_env: true,
            in_keychain: in_store(name),
            in_manifest: in_manifest(name),
        });
    }

    for name in manifest_secrets {
        if !seen.contains(name) && in_store(name) {
            seen.insert(name.clone());
            detected.push(SecretDetected {
                name: name.clone(),
                in_env: false,
                in_keychain: true,
                in_manifest: true,
            });
        }
    }
    detected
}
