//! Validation errors for pool records.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while validating or parsing pool records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The pool type is not one the cluster understands.
    #[error("invalid pool type {0:?}: expected \"replicated\" or \"erasure\"")]
    InvalidPoolType(String),

    /// A desired-state record failed validation.
    #[error("invalid spec for pool {name:?}: {reason}")]
    InvalidSpec {
        /// Name of the offending pool.
        name: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl CoreError {
    pub(crate) fn invalid_spec(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
