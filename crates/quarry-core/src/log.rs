use crate::stmt::Value;

use std::time::Duration;

/// Observes executed statements.
///
/// Called after each statement round-trip with the statement text, its
/// bindings, and the measured duration. Implementations must not panic; the
/// engine treats recording as fire-and-forget and a statement's outcome never
/// depends on it.
pub trait QueryLog: Send + Sync + 'static {
    fn record(&self, sql: &str, bindings: &[Value], elapsed: Duration);
}

/// A `QueryLog` that discards everything.
#[derive(Debug, Default)]
pub struct NullLog;

impl QueryLog for NullLog {
    fn record(&self, _sql: &str, _bindings: &[Value], _elapsed: Duration) {}
}
