//! `terminal` module: the terminal font.
use super::ApplyContext;
use crate::outcome::{Category, Outcome};
use crate::resources::font::FontResource;
use crate::resources::{Resource, ResourceChange};

const MODULE: &str = "terminal";

/// Install `terminal.font` unless a matching font is already present.
#[must_use]
pub fn apply_terminal(ctx: &ApplyContext<'_>) -> Vec<Outcome> {
    let font = ctx.manifest.get_str("terminal.font");
    if font.is_empty() {
        return Vec::new();
    }
    let resource = FontResource::new(
        font,
        ctx.platform,
        &ctx.home,
        ctx.executor,
        ctx.downloader,
        ctx.package_manager(),
    );
    let outcome = match resource.ensure() {
        Ok(ResourceChange::Applied) => {
            Outcome::ok(Category::Font, MODULE, font, resource.installed_message())
        }
        Ok(ResourceChange::AlreadyCorrect) => {
            Outcome::skip(Category::Font, MODULE, font, "already installed")
        }
        Ok(ResourceChange::Skipped { reason }) => Outcome::skip(Category::Font, MODULE, font, reason),
        Err(e) => Outcome::fail(Category::Font, MODULE, font, format!("{e:#}")),
    };
    vec![outcome]
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::apply::test_support::FakeDownloader;
    use crate::manifest::Manifest;
    use crate::platform::{Arch, EnvVars, Os, Platform};
    use crate::resources::test_helpers::MockExecutor;
    use serde_json::json;

    #[test]
    fn installed_font_is_skipped() {
        let home = tempfile::tempdir().unwrap();
        let m = Manifest::from_value("/sync", json!({ "terminal": { "font": "Hack Nerd Font" } }))
            .unwrap();
        let env = EnvVars::default();
        let exec = MockExecutor::ok("Hack Nerd Font\n");
        let dl = FakeDownloader::default();
        let ctx = ApplyContext::new(
            &m,
            Platform::new(Os::Linux, Arch::Amd64),
            home.path(),
            &env,
            &exec,
            &dl,
        );

        let outcomes = apply_terminal(&ctx);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].category, Category::Font);
        assert!(outcomes[0].skipped);
        assert!(dl.downloads().is_empty());
    }

    #[test]
    fn macos_without_brew_fails() {
        let home = tempfile::tempdir().unwrap();
        let m = Manifest::from_value("/sync", json!({ "terminal": { "font": "Hack" } })).unwrap();
        let env = EnvVars::default();
        let exec = MockExecutor::new();
        let dl = FakeDownloader::default();
        let ctx = ApplyContext::new(
            &m,
            Platform::new(Os::Darwin, Arch::Arm64),
            home.path(),
            &env,
            &exec,
            &dl,
        );

        let outcomes = apply_terminal(&ctx);
        assert_eq!(
            outcomes[0].error.as_deref(),
            Some("operation not supported on darwin")
        );
    }

    #[test]
    fn no_font_configured() {
        let m = Manifest::from_value("/sync", json!({ "terminal": {} })).unwrap();
        let env = EnvVars::default();
        let exec = MockExecutor::new();
        let dl = FakeDownloader::default();
        let ctx = ApplyContext::new(
            &m,
            Platform::new(Os::Linux, Arch::Amd64),
            "/home/ada".as_ref(),
            &env,
            &exec,
            &dl,
        );
        assert!(apply_terminal(&ctx).is_empty());
    }
}
