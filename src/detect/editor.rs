//! Default and installed editors.
use super::EditorDetected;
use crate::exec::Executor;
use crate::platform::EnvVars;

/// Editor names and their executables, in preference order.
pub const KNOWN_EDITORS: &[(&str, &str)] = &[
    ("zed", "zed"),
    ("cursor", "cursor"),
    ("vscode", "code"),
    ("neovim", "nvim"),
    ("vim", "vim"),
    ("nano", "nano"),
    ("emacs", "emacs"),
    ("sublime", "subl"),
    ("atom", "atom"),
];

/// Editor name for an executable name (`code` is `vscode`).
#[must_use]
pub fn normalize_editor_name(command: &str) -> String {
    match command {
        "code" => "vscode",
        "nvim" => "neovim",
        "subl" => "sublime",
        other => other,
    }
    .to_string()
}

/// `$EDITOR` (then `$VISUAL`) as the default, other installed editors in
/// preference order. Without either variable the first installed editor is
/// the default.
#[must_use]
pub fn detect_editor(env: &EnvVars, executor: &dyn Executor) -> EditorDetected {
    let declared = env
        .get("EDITOR")
        .or_else(|| env.get("VISUAL"))
        .map(normalize_editor_name);
    let mut installed = KNOWN_EDITORS
        .iter()
        .filter(|(_, command)| executor.which(command))
        .map(|(name, _)| (*name).to_string());

    let default = match declared {
        Some(name) => name,
        None => installed.next().unwrap_or_default(),
    };
    let others = installed.filter(|name| *name != default).collect();
    EditorDetected { default, others }
}
