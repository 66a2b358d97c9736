//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a per-request failure. Validation and precondition
/// failures get their own kind; storage failures that carry no domain meaning
/// collapse into [`DomainError::Infrastructure`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A pet, inventory or owner record is absent.
    #[error("{0} not found")]
    NotFound(String),

    /// The owner is already bound to a pet.
    #[error("owner already has a pet")]
    AlreadyOwnsPet,

    /// An action was attempted on a dead pet.
    #[error("pet is dead")]
    DeadPet,

    /// Sleep was requested for a pet that is already asleep.
    #[error("pet is already sleeping")]
    AlreadySleeping,

    /// The pet has not slept long enough to be woken.
    #[error("pet needs {remaining_hours:.1} more hours of sleep")]
    SleepIncomplete { remaining_hours: f64 },

    /// The item name is not in the catalog (or is the wrong kind for the action).
    #[error("invalid item: {0}")]
    InvalidItem(String),

    /// The inventory lacked the required quantity at decrement time.
    #[error("insufficient resource: {0}")]
    InsufficientResource(String),

    /// Non-positive quantity, empty identifier or name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A versioned write lost an optimistic concurrency race.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Opaque persistence failure.
    #[error("infrastructure failure: {0}")]
    Infrastructure(String),
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_item(name: impl Into<String>) -> Self {
        Self::InvalidItem(name.into())
    }

    pub fn insufficient(msg: impl Into<String>) -> Self {
        Self::InsufficientResource(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn infrastructure(msg: impl Into<String>) -> Self {
        Self::Infrastructure(msg.into())
    }

    pub fn sleep_incomplete(remaining_hours: f64) -> Self {
        Self::SleepIncomplete { remaining_hours }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_incomplete_renders_remaining_hours() {
        let err = DomainError::sleep_incomplete(7.0);
        assert_eq!(err.to_string(), "pet needs 7.0 more hours of sleep");
    }

    #[test]
    fn not_found_names_the_record() {
        assert_eq!(DomainError::not_found("pet").to_string(), "pet not found");
    }
}
