use super::Error;
use crate::stmt::Value;

/// Error from executing a statement, carrying the statement text and its
/// bindings for diagnostics.
#[derive(Debug)]
pub(super) struct ExecutionError {
    pub(super) sql: Box<str>,
    #[allow(dead_code)]
    pub(super) bindings: Vec<Value>,
    pub(super) cause: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for ExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

impl core::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "query execution failed: {}: {}", self.sql, self.cause)?;
        let mut source = self.cause.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Creates an error from a failed statement execution.
    pub fn execution(
        sql: impl Into<Box<str>>,
        bindings: Vec<Value>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Error {
        Error::from(super::ErrorKind::Execution(ExecutionError {
            sql: sql.into(),
            bindings,
            cause: Box::new(cause),
        }))
    }

    /// Returns `true` if this error is a statement execution failure.
    pub fn is_execution(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Execution(_))
    }
}
