use super::Error;

/// Error when an operation requires a persisted entity but the record has
/// never been stored.
#[derive(Debug)]
pub(super) struct NotPersistedError {
    pub(super) entity: Box<str>,
}

impl std::error::Error for NotPersistedError {}

impl core::fmt::Display for NotPersistedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "entity not persisted: {}", self.entity)
    }
}

impl Error {
    /// Creates an error for an operation on an unpersisted record.
    pub fn not_persisted(entity: impl Into<Box<str>>) -> Error {
        Error::from(super::ErrorKind::NotPersisted(NotPersistedError {
            entity: entity.into(),
        }))
    }

    /// Returns `true` if this error is an operation on an unpersisted record.
    pub fn is_not_persisted(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::NotPersisted(_))
    }
}
