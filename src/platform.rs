use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use anyhow::Result;

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    /// macOS.
    Darwin,
    /// Any Linux distribution.
    Linux,
    /// Windows.
    Windows,
}

impl Os {
    /// Key used for OS-specific manifest entries (`darwin`, `linux`, `windows`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }

    /// Parse an OS key. Unknown keys yield `None`.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "darwin" => Some(Self::Darwin),
            "linux" => Some(Self::Linux),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// CPU architecture, named the way release assets usually are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// x86-64.
    Amd64,
    /// 64-bit ARM.
    Arm64,
    /// Anything else, by its Rust target name.
    Other(&'static str),
}

impl Arch {
    /// Canonical architecture key (`amd64`, `arm64`, or the raw target name).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::Other(name) => name,
        }
    }

    /// All spellings that identify this architecture in an asset file name.
    #[must_use]
    pub fn aliases(self) -> Vec<&'static str> {
        match self {
            Self::Amd64 => vec!["amd64", "x86_64", "x64"],
            Self::Arm64 => vec!["arm64", "aarch64"],
            Self::Other(name) => vec![name],
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub const fn detect() -> Self {
        Self {
            os: Self::detect_os(),
            arch: Self::detect_arch(),
        }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Whether this is Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    const fn detect_os() -> Os {
        if cfg!(target_os = "macos") {
            Os::Darwin
        } else if cfg!(target_os = "windows") {
            Os::Windows
        } else {
            // Other Unix-like systems behave like Linux for our purposes
            Os::Linux
        }
    }

    const fn detect_arch() -> Arch {
        if cfg!(target_arch = "x86_64") {
            Arch::Amd64
        } else if cfg!(target_arch = "aarch64") {
            Arch::Arm64
        } else {
            Arch::Other(std::env::consts::ARCH)
        }
    }
}

/// Resolve the user's home directory from the environment.
///
/// # Errors
///
/// Returns an error if neither `HOME` nor (on Windows) `USERPROFILE` is set.
pub fn home_dir() -> Result<PathBuf> {
    let home = if cfg!(target_os = "windows") {
        std::env::var("USERPROFILE")
            .or_else(|_| std::env::var("HOME"))
            .map_err(|_| anyhow::anyhow!("neither USERPROFILE nor HOME environment variable is set"))?
    } else {
        std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable is not set"))?
    };
    Ok(PathBuf::from(home))
}

/// Immutable snapshot of environment variables.
///
/// Scanners and shell configuration read the environment through this type
/// so tests can supply a fixed set of variables without mutating the process
/// environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars(BTreeMap<String, String>);

impl EnvVars {
    /// Capture the current process environment (non-UTF-8 entries are dropped).
    #[must_use]
    pub fn capture() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Value of `name`, treating an empty value as unset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Whether `name` is set to a non-empty value.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of all variables with non-empty values, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| k.as_str())
    }

    /// Builder-style insert, mostly for tests.
    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn os_keys_round_trip() {
        for os in [Os::Darwin, Os::Linux, Os::Windows] {
            assert_eq!(Os::from_key(os.key()), Some(os));
        }
        assert_eq!(Os::from_key("plan9"), None);
    }

    #[test]
    fn os_display() {
        assert_eq!(Os::Darwin.to_string(), "darwin");
        assert_eq!(Os::Linux.to_string(), "linux");
        assert_eq!(Os::Windows.to_string(), "windows");
    }

    #[test]
    fn amd64_aliases_cover_common_spellings() {
        let aliases = Arch::Amd64.aliases();
        assert!(aliases.contains(&"x86_64"));
        assert!(aliases.contains(&"x64"));
    }

    #[test]
    fn platform_new_windows() {
        let p = Platform::new(Os::Windows, Arch::Amd64);
        assert!(p.is_windows());
        assert!(!Platform::new(Os::Linux, Arch::Arm64).is_windows());
    }

    #[test]
    fn detect_matches_compile_target() {
        let p = Platform::detect();
        if cfg!(target_os = "windows") {
            assert_eq!(p.os, Os::Windows);
        } else if cfg!(target_os = "macos") {
            assert_eq!(p.os, Os::Darwin);
        } else {
            assert_eq!(p.os, Os::Linux);
        }
    }

    #[test]
    fn env_vars_treat_empty_as_unset() {
        let env = EnvVars::default().with("A", "1").with("B", "");
        assert_eq!(env.get("A"), Some("1"));
        assert_eq!(env.get("B"), None);
        assert!(!env.is_set("C"));
        assert_eq!(env.names().collect::<Vec<_>>(), vec!["A"]);
    }
}
