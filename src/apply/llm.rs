//! `llm` module: local model runtime.
use super::ApplyContext;
use crate::outcome::{Category, Outcome};

const MODULE: &str = "llm";

/// Install `llm.local.runtime` and report each `llm.local.models` entry.
///
/// Models are never pulled here: pulling takes minutes per model, so a
/// missing model is reported as skipped with the command to run.
#[must_use]
pub fn apply_llm(ctx: &ApplyContext<'_>) -> Vec<Outcome> {
    let runtime = ctx.manifest.get_str("llm.local.runtime");
    if runtime.is_empty() {
        return Vec::new();
    }
    let mut outcomes = Vec::new();
    if ctx.package_manager().is_some() {
        outcomes.push(ctx.install_package(MODULE, runtime, runtime, runtime));
    }

    let models = ctx.manifest.get_string_slice("llm.local.models");
    if models.is_empty() {
        return outcomes;
    }
    if runtime != "ollama" {
        outcomes.extend(models.iter().map(|model| {
            Outcome::skip(
                Category::Configure,
                MODULE,
                model,
                "only ollama supported for model pulling",
            )
        }));
        return outcomes;
    }
    if !ctx.executor.which("ollama") {
        outcomes.extend(
            models
                .iter()
                .map(|model| Outcome::fail(Category::Configure, MODULE, model, "ollama not installed")),
        );
        return outcomes;
    }

    let pulled = ctx
        .executor
        .run_unchecked("ollama", &["list"])
        .map(|r| r.stdout)
        .unwrap_or_default();
    outcomes.extend(models.iter().map(|model| {
        if pulled.contains(model.as_str()) {
            Outcome::skip(Category::Configure, MODULE, model, "already pulled")
        } else {
            Outcome::skip(
                Category::Configure,
                MODULE,
                model,
                format!("run 'ollama pull {model}' to download"),
            )
        }
    }));
    outcomes
}
