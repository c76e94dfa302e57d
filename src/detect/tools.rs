//! Command-line tools on `PATH`.
use super::CliDetected;
use crate::exec::Executor;

/// Tools installed through a package manager.
#[rustfmt::skip]
pub const KNOWN_CLI_TOOLS: &[&str] = &[
    // runtimes
    "node", "bun", "deno", "go", "cargo", "python3", "ruby",
    // package managers
    "npm", "yarn", "pnpm", "pip", "gem",
    // git
    "git", "gh", "lazygit", "tig",
    // containers
    "docker", "kubectl", "helm",
    // search and navigation
    "ripgrep", "rg", "fd", "bat", "eza", "exa",
    // utilities
    "jq", "yq", "curl", "wget", "httpie",
    // build
    "make", "cmake", "ninja",
    // cloud
    "aws", "gcloud", "az",
];

/// Tools that add an init line to the shell rc file.
pub const KNOWN_SHELL_TOOLS: &[&str] = &["zoxide", "fzf", "direnv", "nvm", "rbenv", "pyenv"];

/// Prompt tools, in detection priority order.
pub const KNOWN_PROMPT_TOOLS: &[&str] = &["oh-my-posh", "starship"];

/// Tools distributed as GitHub release binaries.
pub const KNOWN_CUSTOM_TOOLS: &[&str] = &["pact", "churn", "annotr"];

/// Known tools present on `PATH`, in list order.
///
/// `rg` is the ripgrep binary; it is never reported under its own name.
#[must_use]
pub fn detect_cli(executor: &dyn Executor) -> CliDetected {
    let installed = |list: &[&str]| -> Vec<String> {
        list.iter()
            .filter(|tool| **tool != "rg" && executor.which(tool))
            .map(|tool| (*tool).to_string())
            .collect()
    };
    CliDetected {
        tools: installed(KNOWN_CLI_TOOLS),
        custom: installed(KNOWN_CUSTOM_TOOLS),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    #[test]
    fn reports_tools_in_list_order() {
        let exec = MockExecutor::new().on_path(&["lazygit", "git", "rg", "churn", "unknown"]);
        let cli = detect_cli(&exec);
        assert_eq!(cli.tools, vec!["git", "lazygit"]);
        assert_eq!(cli.custom, vec!["churn"]);
        assert_eq!(exec.call_count(), 0);
    }

    #[test]
    fn ripgrep_reported_once() {
        let exec = MockExecutor::new().on_path(&["ripgrep", "rg"]);
        assert_eq!(detect_cli(&exec).tools, vec!["ripgrep"]);
    }
}
