//! LLM providers, local runtime, and coding agents.
use super::{LlmDetected, LocalLlm};
use crate::exec::Executor;
use crate::platform::EnvVars;

/// API-key variables and the provider each one implies.
pub const LLM_PROVIDER_KEYS: &[(&str, &str)] = &[
    ("ANTHROPIC_API_KEY", "claude"),
    ("OPENAI_API_KEY", "openai"),
    ("GEMINI_API_KEY", "gemini"),
    ("GOOGLE_API_KEY", "gemini"),
    ("GROQ_API_KEY", "groq"),
    ("REPLICATE_API_KEY", "replicate"),
    ("XAI_API_KEY", "grok"),
];

/// Coding agent executables.
pub const KNOWN_CODING_AGENTS: &[&str] = &["claude", "opencode", "aider", "cursor"];

/// Model names from `ollama list` output, tags stripped. The first line is
/// the column header.
#[must_use]
pub fn parse_ollama_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .filter_map(|field| field.split(':').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Providers with keys in `env` (deduplicated, table order), the local
/// runtime when `ollama` is on `PATH`, and installed coding agents.
#[must_use]
pub fn detect_llm(env: &EnvVars, executor: &dyn Executor) -> LlmDetected {
    let mut providers = Vec::<String>::new();
    for (var, provider) in LLM_PROVIDER_KEYS {
        if env.is_set(var) && !providers.iter().any(|p| p == provider) {
            providers.push((*provider).to_string());
        }
    }

    let local = executor.which("ollama").then(|| LocalLlm {
        runtime: "ollama".to_string(),
        models: executor
            .run_unchecked("ollama", &["list"])
            .ok()
            .filter(|r| r.success)
            .map(|r| parse_ollama_list(&r.stdout))
            .unwrap_or_default(),
    });

    LlmDetected {
        providers,
        local,
        agents: KNOWN_CODING_AGENTS
            .iter()
            .filter(|agent| executor.which(agent))
            .map(|agent| (*agent).to_string())
            .collect(),
    }
}
