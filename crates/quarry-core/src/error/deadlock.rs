use super::Error;

/// Deadlock or lock-wait timeout reported by the server.
///
/// The one retryable error class: the engine's save path retries these with
/// backoff before surfacing them.
#[derive(Debug)]
pub(super) struct DeadlockError {
    #[allow(dead_code)]
    pub(super) code: u16,
    pub(super) detail: Box<str>,
}

impl std::error::Error for DeadlockError {}

impl core::fmt::Display for DeadlockError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "deadlock detected: {}", self.detail)
    }
}

impl Error {
    /// Creates an error from a server-reported deadlock or lock wait timeout.
    pub fn deadlock(code: u16, detail: impl Into<Box<str>>) -> Error {
        Error::from(super::ErrorKind::Deadlock(DeadlockError {
            code,
            detail: detail.into(),
        }))
    }

    /// Returns `true` if this error, or any cause beneath added context, is a
    /// deadlock.
    pub fn is_deadlock(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), super::ErrorKind::Deadlock(_)))
    }
}
