use super::Error;

/// Error when an entity lookup by key finds no row.
#[derive(Debug)]
pub(super) struct NotFoundError {
    pub(super) entity: Box<str>,
    pub(super) key: Box<str>,
}

impl std::error::Error for NotFoundError {}

impl core::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "entity not found: {} key={}", self.entity, self.key)
    }
}

impl Error {
    /// Creates an error for a required entity that does not exist.
    pub fn not_found(entity: impl Into<Box<str>>, key: impl Into<Box<str>>) -> Error {
        Error::from(super::ErrorKind::NotFound(NotFoundError {
            entity: entity.into(),
            key: key.into(),
        }))
    }

    /// Returns `true` if this error is a missing entity lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::NotFound(_))
    }
}
