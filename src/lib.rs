//! pact: a declarative developer-environment manifest.
//!
//! One JSON manifest (`pact.json` under a `.pact/` sync root) describes the
//! tools, shell, git identity, editors, fonts, apps, LLM tooling, secrets,
//! and dotfiles of a developer machine. pact applies that manifest to a
//! machine and imports a machine back into the manifest.
//!
//! The public API is organised into these layers:
//!
//! - **[`manifest`]**: the untyped document, dot-path access, and sync items
//! - **[`resources`]**: idempotent `check + apply` primitives (symlinks, packages, ...)
//! - **[`sync`]** and **[`apply`]**: put the manifest onto the machine
//! - **[`detect`]**, **[`diff`]**, **[`merge`]**: read the machine back into the manifest
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod apply;
pub mod cli;
pub mod commands;
pub mod detect;
pub mod diff;
pub mod error;
pub mod exec;
pub mod logging;
pub mod manifest;
pub mod merge;
pub mod outcome;
pub mod platform;
pub mod resources;
pub mod sync;
