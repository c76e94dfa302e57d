//! Command: print version information.

/// The build version: `PACT_VERSION` at compile time, else the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("PACT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the pact version to stdout.
pub fn run() {
    println!("pact {}", version());
}
