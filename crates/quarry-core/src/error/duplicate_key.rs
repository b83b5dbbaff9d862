use super::Error;

/// Unique or primary key constraint violation.
#[derive(Debug)]
pub(super) struct DuplicateKeyError {
    pub(super) detail: Box<str>,
}

impl std::error::Error for DuplicateKeyError {}

impl core::fmt::Display for DuplicateKeyError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "duplicate key violation: {}", self.detail)
    }
}

impl Error {
    /// Creates an error from a server-reported duplicate key violation.
    pub fn duplicate_key(detail: impl Into<Box<str>>) -> Error {
        Error::from(super::ErrorKind::DuplicateKey(DuplicateKeyError {
            detail: detail.into(),
        }))
    }

    /// Returns `true` if this error, or any cause beneath added context, is a
    /// duplicate key violation.
    pub fn is_duplicate_key(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), super::ErrorKind::DuplicateKey(_)))
    }
}
