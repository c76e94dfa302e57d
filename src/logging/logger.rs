//! Structured logger with outcome collection and a run summary.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{OUTCOME_TARGET, STAGE_TARGET};
use super::types::Log;
use super::utils::log_file_path;
use crate::outcome::{Outcome, Tally};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger that reports outcomes as they happen and prints a
/// tally at the end of the run.
///
/// All messages also reach the persistent log file at
/// `$XDG_CACHE_HOME/pact/<command>.log` through the file layer installed by
/// [`init_subscriber`](super::subscriber::init_subscriber).
#[derive(Debug)]
pub struct Logger {
    outcomes: Mutex<Vec<Outcome>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command`.
    ///
    /// Only remembers where the log file lives for the summary; the file is
    /// written by the tracing file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    /// Create a logger that reports `log_file` in its summary.
    #[must_use]
    pub const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            outcomes: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Return all recorded outcomes.
    #[must_use]
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Print one outcome line and keep the outcome for the summary.
    pub fn record(&self, outcome: &Outcome) {
        let label = format!("{}/{}", outcome.module, outcome.name);
        if !outcome.success {
            let err = outcome.error.as_deref().unwrap_or("failed");
            self.error(&format!("{label}: {err}"));
        } else if outcome.skipped {
            tracing::info!(
                target: OUTCOME_TARGET,
                category = %outcome.category,
                "\x1b[2m○ {label} ({})\x1b[0m",
                outcome.message
            );
        } else {
            tracing::info!(
                target: OUTCOME_TARGET,
                category = %outcome.category,
                "\x1b[32m✓\x1b[0m {label} ({})",
                outcome.message
            );
        }
        if let Ok(mut guard) = self.outcomes.lock() {
            guard.push(outcome.clone());
        }
    }

    /// Count recorded outcomes by class.
    #[must_use]
    pub fn tally(&self) -> Tally {
        self.outcomes
            .lock()
            .map_or_else(|_| Tally::default(), |g| Tally::of(&g))
    }

    /// Return `true` if any recorded outcome failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.tally().failed > 0
    }

    /// Print the applied/skipped/failed tally and the log file location.
    pub fn print_summary(&self) {
        let tally = self.tally();
        if tally.total() == 0 {
            return;
        }

        self.stage("Summary");
        self.info(&format!(
            "{} actions: \x1b[32m{} applied\x1b[0m, \x1b[33m{} skipped\x1b[0m, \x1b[31m{} failed\x1b[0m",
            tally.total(),
            tally.applied,
            tally.skipped,
            tally.failed
        ));
        for failed in self.outcomes().iter().filter(|o| !o.success) {
            self.info(&format!(
                "\x1b[31m✗ {}/{}\x1b[0m {}",
                failed.module,
                failed.name,
                failed.error.as_deref().unwrap_or_default()
            ));
        }

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record(&self, outcome: &Outcome) {
        self.record(outcome);
    }
}
