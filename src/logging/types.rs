//! The [`Log`] trait shared by every logging backend.
use crate::outcome::Outcome;

/// Abstraction over logging backends.
///
/// Commands report through this trait so they can be driven by a
/// [`Logger`](super::logger::Logger) in the binary and by a capturing
/// implementation in tests.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Report one outcome and keep it for the summary.
    fn record(&self, outcome: &Outcome);
}
