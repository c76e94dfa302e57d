//! `apps` module: desktop applications from `apps.<os>`.
use super::ApplyContext;
use crate::outcome::{Category, Outcome};

const MODULE: &str = "apps";

/// Package identifiers per manager (`brew`, `winget`, `choco`) for common
/// applications.
const APP_PACKAGES: &[(&str, [Option<&str>; 3])] = &[
    ("brave", [Some("brave-browser"), Some("Brave.Brave"), Some("brave")]),
    ("discord", [Some("discord"), Some("Discord.Discord"), Some("discord")]),
    ("spotify", [Some("spotify"), Some("Spotify.Spotify"), Some("spotify")]),
    ("steam", [Some("steam"), Some("Valve.Steam"), Some("steam")]),
    ("cursor", [Some("cursor"), Some("Cursor.Cursor"), None]),
    (
        "vscode",
        [
            Some("visual-studio-code"),
            Some("Microsoft.VisualStudioCode"),
            Some("vscode"),
        ],
    ),
    ("slack", [Some("slack"), Some("SlackTechnologies.Slack"), Some("slack")]),
    ("notion", [Some("notion"), Some("Notion.Notion"), Some("notion")]),
    ("figma", [Some("figma"), Some("Figma.Figma"), Some("figma")]),
    (
        "docker",
        [Some("docker"), Some("Docker.DockerDesktop"), Some("docker-desktop")],
    ),
];

/// Package identifier for `app` under the manager named `manager`. Apps
/// without a known mapping install under their own name.
#[must_use]
pub fn app_package(app: &str, manager: &str) -> String {
    let column = match manager {
        "brew" => 0,
        "winget" => 1,
        "choco" => 2,
        _ => return app.to_string(),
    };
    let lower = app.to_lowercase();
    APP_PACKAGES
        .iter()
        .find(|(name, _)| *name == lower)
        .and_then(|(_, ids)| ids.get(column).copied().flatten())
        .map_or_else(|| app.to_string(), str::to_string)
}

fn install_app(ctx: &ApplyContext<'_>, app: &str) -> Outcome {
    let Some(pm) = ctx.package_manager() else {
        return Outcome::fail(Category::App, MODULE, app, "no package manager available");
    };
    // Approximate: GUI apps rarely put a same-named binary on PATH.
    if ctx.executor.which(&app.to_lowercase()) {
        return Outcome::skip(Category::App, MODULE, app, "already installed");
    }
    let package = app_package(app, pm.name());
    tracing::debug!("install app {app} as {package} via {}", pm.name());
    match pm.install_app(&package, ctx.executor) {
        Ok(()) => Outcome::ok(Category::App, MODULE, app, "installed"),
        Err(e) => Outcome::fail(Category::App, MODULE, app, format!("{e:#}")),
    }
}

/// Install `apps.<os>.install` and report `apps.<os>.shortcuts` entries.
#[must_use]
pub fn apply_apps(ctx: &ApplyContext<'_>) -> Vec<Outcome> {
    let key = format!("apps.{}", ctx.platform.os.key());
    let mut outcomes: Vec<Outcome> = ctx
        .manifest
        .get_string_slice(&format!("{key}.install"))
        .iter()
        .map(|app| install_app(ctx, app))
        .collect();

    if let Some(shortcuts) = ctx.manifest.get_map(&format!("{key}.shortcuts")) {
        outcomes.extend(
            shortcuts
                .keys()
                .map(|name| Outcome::skip(Category::App, MODULE, name, "shortcut configured")),
        );
    }
    outcomes
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::apply::test_support::FakeDownloader;
    use crate::manifest::Manifest;
    use crate::platform::{Arch, EnvVars, Os, Platform};
    use crate::resources::package::{Apt, Choco, Winget};
    use crate::resources::test_helpers::MockExecutor;
    use serde_json::json;

    #[test]
    fn package_mapping() {
        assert_eq!(app_package("Brave", "brew"), "brave-browser");
        assert_eq!(app_package("docker", "choco"), "docker-desktop");
        assert_eq!(app_package("vscode", "winget"), "Microsoft.VisualStudioCode");
        assert_eq!(app_package("cursor", "choco"), "cursor");
        assert_eq!(app_package("obsidian", "brew"), "obsidian");
        assert_eq!(app_package("slack", "scoop"), "slack");
    }

    #[test]
    fn installs_only_current_os_apps_and_notes_shortcuts() {
        let m = Manifest::from_value(
            "/sync",
            json!({ "apps": {
                "darwin": { "install": ["raycast"] },
                "windows": {
                    "install": ["brave", "discord"],
                    "shortcuts": { "terminal": "ctrl+alt+t", "browser": "ctrl+alt+b" }
                }
            } }),
        )
        .unwrap();
        let env = EnvVars::default();
        let exec = MockExecutor::ok("").on_path(&["discord"]);
        let dl = FakeDownloader::default();
        let ctx = ApplyContext::new(
            &m,
            Platform::new(Os::Windows, Arch::Amd64),
            "C:/Users/ada".as_ref(),
            &env,
            &exec,
            &dl,
        )
        .with_package_manager(Some(Box::new(Winget)));

        let outcomes = apply_apps(&ctx);
        let summary: Vec<_> = outcomes
            .iter()
            .map(|o| (o.name.as_str(), o.skipped, o.message.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("brave", false, "installed"),
                ("discord", true, "already installed"),
                ("terminal", true, "shortcut configured"),
                ("browser", true, "shortcut configured"),
            ]
        );
        assert_eq!(
            exec.calls(),
            vec![
                "winget install --id Brave.Brave -e --silent --accept-package-agreements --accept-source-agreements"
            ]
        );
    }

    #[test]
    fn managers_without_app_support_fail_per_app() {
        let m = Manifest::from_value("/sync", json!({ "apps": { "linux": { "install": ["slack"] } } }))
            .unwrap();
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
        assert_eq!(
            apply_apps(&ctx)[0].error.as_deref(),
            Some("no package manager available")
        );

        let ctx = ctx.with_package_manager(Some(Box::new(Apt)));
        assert_eq!(
            apply_apps(&ctx)[0].error.as_deref(),
            Some("app installation not supported for apt")
        );
    }

    #[test]
    fn failed_app_install_carries_output() {
        let m = Manifest::from_value(
            "/sync",
            json!({ "apps": { "windows": { "install": ["figma"] } } }),
        )
        .unwrap();
        let env = EnvVars::default();
        let exec = MockExecutor::with_responses(vec![(false, "package not found".to_string())]);
        let dl = FakeDownloader::default();
        let ctx = ApplyContext::new(
            &m,
            Platform::new(Os::Windows, Arch::Amd64),
            "C:/Users/ada".as_ref(),
            &env,
            &exec,
            &dl,
        )
        .with_package_manager(Some(Box::new(Choco)));

        let outcomes = apply_apps(&ctx);
        assert_eq!(
            outcomes[0].error.as_deref(),
            Some("exit status 1: package not found")
        );
        assert_eq!(exec.calls(), vec!["choco install figma -y"]);
    }
}
