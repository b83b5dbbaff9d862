use super::Error;

/// Optimistic lock failure: the row's stored version no longer matches the
/// version the record was loaded with.
#[derive(Debug)]
pub(super) struct LockConflictError {
    pub(super) entity: Box<str>,
    pub(super) key: Box<str>,
    pub(super) expected_version: i64,
}

impl std::error::Error for LockConflictError {}

impl core::fmt::Display for LockConflictError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "optimistic lock conflict: {} key={} expected version {}",
            self.entity, self.key, self.expected_version
        )
    }
}

impl Error {
    /// Creates an error for a versioned update that matched no row.
    pub fn lock_conflict(
        entity: impl Into<Box<str>>,
        key: impl Into<Box<str>>,
        expected_version: i64,
    ) -> Error {
        Error::from(super::ErrorKind::LockConflict(LockConflictError {
            entity: entity.into(),
            key: key.into(),
            expected_version,
        }))
    }

    /// Returns `true` if this error is an optimistic lock conflict.
    pub fn is_lock_conflict(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::LockConflict(_))
    }
}
