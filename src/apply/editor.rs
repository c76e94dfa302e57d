//! `editor` module: default editor and its extensions.
use std::collections::{HashMap, HashSet};

use super::ApplyContext;
use crate::outcome::{Category, Outcome};
use crate::resources::extension::{ExtensionResource, extension_cli, installed_extensions};
use crate::resources::{Applicable, ResourceChange, ResourceState};

const MODULE: &str = "editor";

/// Executable that shows the editor is installed.
fn editor_binary(editor: &str) -> Option<&'static str> {
    match editor {
        "code" | "vscode" => Some("code"),
        "cursor" => Some("cursor"),
        "zed" => Some("zed"),
        "nvim" | "neovim" => Some("nvim"),
        "vim" => Some("vim"),
        _ => None,
    }
}

fn editor_package(editor: &str, manager: &str) -> String {
    match (editor, manager) {
        ("code" | "vscode", "brew") => "visual-studio-code".to_string(),
        _ => editor.to_string(),
    }
}

fn install_editor(ctx: &ApplyContext<'_>, editor: &str) -> Outcome {
    let Some(binary) = editor_binary(editor) else {
        return Outcome::skip(Category::Install, MODULE, editor, "manual install required");
    };
    if ctx.executor.which(binary) {
        return Outcome::skip(Category::Install, MODULE, editor, "already installed");
    }
    let Some(pm) = ctx.package_manager() else {
        return Outcome::skip(Category::Install, MODULE, editor, "manual install required");
    };
    ctx.install_package(MODULE, editor, &editor_package(editor, pm.name()), binary)
}

/// Install the default editor, then the extensions listed under
/// `editor.extensions` (for the default editor), `editor.vscode.extensions`
/// and `editor.cursor.extensions`.
///
/// Installed extensions are listed once per editor CLI; listed ones are
/// skipped without running an install.
#[must_use]
pub fn apply_editor(ctx: &ApplyContext<'_>) -> Vec<Outcome> {
    let mut outcomes = Vec::new();
    let default_editor = ctx.manifest.get_str("editor.default");
    if !default_editor.is_empty() {
        outcomes.push(install_editor(ctx, default_editor));
    }

    let groups = [
        (default_editor, ctx.manifest.get_string_slice("editor.extensions")),
        ("vscode", ctx.manifest.get_string_slice("editor.vscode.extensions")),
        ("cursor", ctx.manifest.get_string_slice("editor.cursor.extensions")),
    ];
    let mut installed: HashMap<&'static str, HashSet<String>> = HashMap::new();

    for (editor, extensions) in groups {
        for id in extensions {
            let Some(cli) = extension_cli(editor) else {
                outcomes.push(Outcome::skip(
                    Category::Extension,
                    MODULE,
                    &id,
                    "extensions not supported for this editor",
                ));
                continue;
            };
            let listed = installed
                .entry(cli)
                .or_insert_with(|| installed_extensions(cli, ctx.executor));
            outcomes.push(install_extension(ctx, cli, &id, listed));
        }
    }
    outcomes
}

fn install_extension(
    ctx: &ApplyContext<'_>,
    cli: &'static str,
    id: &str,
    installed: &HashSet<String>,
) -> Outcome {
    let resource = ExtensionResource::new(cli, id, ctx.executor);
    if resource.state_from_installed(installed) == ResourceState::Correct {
        return Outcome::skip(Category::Extension, MODULE, id, "already installed");
    }
    tracing::debug!("installing extension {}", resource.description());
    match resource.apply() {
        Ok(ResourceChange::Skipped { reason }) => {
            Outcome::skip(Category::Extension, MODULE, id, reason)
        }
        Ok(_) => Outcome::ok(Category::Extension, MODULE, id, "installed"),
        Err(e) => Outcome::fail(Category::Extension, MODULE, id, format!("{e:#}")),
    }
}
