//! Store-level errors and their mapping into the domain taxonomy.

use thiserror::Error;

use petcare_core::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence error.
///
/// These are **infrastructure errors** as opposed to domain errors. Only
/// `NotFound`, `Concurrency` and `Invalid` carry domain meaning; everything
/// else reaches callers as an opaque `DomainError::Infrastructure`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("record already exists: {0}")]
    Duplicate(String),

    /// The mutation itself was rejected (e.g. a counter would overflow).
    #[error("invalid mutation: {0}")]
    Invalid(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn poisoned() -> Self {
        StoreError::Backend("lock poisoned".to_string())
    }
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(what) => DomainError::NotFound(what),
            StoreError::Concurrency(msg) => DomainError::Conflict(msg),
            StoreError::Duplicate(msg) => DomainError::Conflict(msg),
            StoreError::Invalid(msg) => DomainError::InvalidArgument(msg),
            StoreError::Backend(msg) => DomainError::Infrastructure(msg),
        }
    }
}
