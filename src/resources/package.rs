//! Package managers and the package installation resource.
use std::fmt::{self, Debug};

use anyhow::{Result, bail};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;
use crate::platform::Os;

/// A system package manager invoked non-interactively.
///
/// One implementation exists per supported manager. The manager for the
/// current machine is resolved once with [`detect_package_manager`] and then
/// passed explicitly to everything that installs software.
pub trait PackageManager: Debug {
    /// Short name (`brew`, `apt`, ...), also used in messages.
    fn name(&self) -> &'static str;

    /// Program and arguments that install a command-line package.
    fn install_command(&self, package: &str) -> (&'static str, Vec<String>);

    /// Program and arguments that install a desktop application, or `None`
    /// if this manager cannot install applications.
    fn app_install_command(&self, _package: &str) -> Option<(&'static str, Vec<String>)> {
        None
    }

    /// Install `package`.
    ///
    /// # Errors
    ///
    /// Returns the exit status and combined output of a failed install.
    fn install(&self, package: &str, executor: &dyn Executor) -> Result<()> {
        let (program, args) = self.install_command(package);
        run_install(executor, program, &args)
    }

    /// Install a desktop application.
    ///
    /// # Errors
    ///
    /// Returns an error if this manager cannot install applications or if
    /// the install fails.
    fn install_app(&self, package: &str, executor: &dyn Executor) -> Result<()> {
        let Some((program, args)) = self.app_install_command(package) else {
            bail!("app installation not supported for {}", self.name());
        };
        run_install(executor, program, &args)
    }
}

fn run_install(executor: &dyn Executor, program: &str, args: &[String]) -> Result<()> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    tracing::debug!("running {program} {}", args.join(" "));
    let result = executor.run_unchecked(program, &args)?;
    if result.success {
        Ok(())
    } else {
        bail!("{}", result.failure_message())
    }
}

fn argv(parts: &[&str], package: &str) -> Vec<String> {
    parts
        .iter()
        .map(|p| (*p).to_string())
        .chain(std::iter::once(package.to_string()))
        .collect()
}

/// Homebrew (macOS, optionally Linux).
#[derive(Debug, Clone, Copy, Default)]
pub struct Brew;

impl PackageManager for Brew {
    fn name(&self) -> &'static str {
        "brew"
    }
    fn install_command(&self, package: &str) -> (&'static str, Vec<String>) {
        ("brew", argv(&["install"], package))
    }
    fn app_install_command(&self, package: &str) -> Option<(&'static str, Vec<String>)> {
        Some(("brew", argv(&["install", "--cask"], package)))
    }
}

/// Debian/Ubuntu apt, run through sudo.
#[derive(Debug, Clone, Copy, Default)]
pub struct Apt;

impl PackageManager for Apt {
    fn name(&self) -> &'static str {
        "apt"
    }
    fn install_command(&self, package: &str) -> (&'static str, Vec<String>) {
        ("sudo", argv(&["apt", "install", "-y"], package))
    }
}

/// Fedora dnf, run through sudo.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dnf;

impl PackageManager for Dnf {
    fn name(&self) -> &'static str {
        "dnf"
    }
    fn install_command(&self, package: &str) -> (&'static str, Vec<String>) {
        ("sudo", argv(&["dnf", "install", "-y"], package))
    }
}

/// Arch Linux pacman, run through sudo.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pacman;

impl PackageManager for Pacman {
    fn name(&self) -> &'static str {
        "pacman"
    }
    fn install_command(&self, package: &str) -> (&'static str, Vec<String>) {
        ("sudo", argv(&["pacman", "-S", "--noconfirm"], package))
    }
}

/// Windows Package Manager.
#[derive(Debug, Clone, Copy, Default)]
pub struct Winget;

impl PackageManager for Winget {
    fn name(&self) -> &'static str {
        "winget"
    }
    fn install_command(&self, package: &str) -> (&'static str, Vec<String>) {
        let mut args = argv(&["install", "--id"], package);
        args.extend(["-e".to_string(), "--silent".to_string()]);
        ("winget", args)
    }
    fn app_install_command(&self, package: &str) -> Option<(&'static str, Vec<String>)> {
        let (program, mut args) = self.install_command(package);
        args.extend([
            "--accept-package-agreements".to_string(),
            "--accept-source-agreements".to_string(),
        ]);
        Some((program, args))
    }
}

/// Scoop (Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct Scoop;

impl PackageManager for Scoop {
    fn name(&self) -> &'static str {
        "scoop"
    }
    fn install_command(&self, package: &str) -> (&'static str, Vec<String>) {
        ("scoop", argv(&["install"], package))
    }
    fn app_install_command(&self, package: &str) -> Option<(&'static str, Vec<String>)> {
        Some(self.install_command(package))
    }
}

/// Chocolatey (Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct Choco;

impl PackageManager for Choco {
    fn name(&self) -> &'static str {
        "choco"
    }
    fn install_command(&self, package: &str) -> (&'static str, Vec<String>) {
        let mut args = argv(&["install"], package);
        args.push("-y".to_string());
        ("choco", args)
    }
    fn app_install_command(&self, package: &str) -> Option<(&'static str, Vec<String>)> {
        Some(self.install_command(package))
    }
}

/// Resolve the package manager for `os`: the first one found on `PATH` in
/// preference order (darwin: brew; linux: apt, dnf, pacman, brew; windows:
/// winget, scoop, choco).
#[must_use]
pub fn detect_package_manager(os: Os, executor: &dyn Executor) -> Option<Box<dyn PackageManager>> {
    let candidates: Vec<Box<dyn PackageManager>> = match os {
        Os::Darwin => vec![Box::new(Brew)],
        Os::Linux => vec![
            Box::new(Apt),
            Box::new(Dnf),
            Box::new(Pacman),
            Box::new(Brew),
        ],
        Os::Windows => vec![Box::new(Winget), Box::new(Scoop), Box::new(Choco)],
    };
    let found = candidates
        .into_iter()
        .find(|pm| executor.which(pm.name()));
    match &found {
        Some(pm) => tracing::debug!("using package manager {}", pm.name()),
        None => tracing::debug!("no package manager found for {os}"),
    }
    found
}

/// A package that provides `binary`, installed through a package manager.
///
/// The package counts as installed when `binary` is on `PATH`, in which case
/// no install command is ever run.
pub struct PackageResource<'a> {
    /// Package name passed to the manager.
    pub package: String,
    /// Executable whose presence means the package is installed.
    pub binary: String,
    manager: &'a dyn PackageManager,
    executor: &'a dyn Executor,
}

impl fmt::Debug for PackageResource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageResource")
            .field("package", &self.package)
            .field("binary", &self.binary)
            .field("manager", &self.manager.name())
            .finish_non_exhaustive()
    }
}

impl<'a> PackageResource<'a> {
    /// A package whose binary has the same name as the package.
    #[must_use]
    pub fn new(package: &str, manager: &'a dyn PackageManager, executor: &'a dyn Executor) -> Self {
        Self::with_binary(package, package, manager, executor)
    }

    /// A package providing a differently named binary.
    #[must_use]
    pub fn with_binary(
        package: &str,
        binary: &str,
        manager: &'a dyn PackageManager,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            package: package.to_string(),
            binary: binary.to_string(),
            manager,
            executor,
        }
    }
}

impl Applicable for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.package, self.manager.name())
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.manager.install(&self.package, self.executor)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for PackageResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if self.executor.which(&self.binary) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
