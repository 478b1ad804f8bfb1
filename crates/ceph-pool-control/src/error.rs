//! Error types for the lifecycle controller.
//!
//! Every fatal error names the pool and the attempted operation, and keeps
//! the client error (with its HTTP status and body) as its source.

use std::fmt;

use ceph_pool_client::ClientError;
use ceph_pool_core::CoreError;
use thiserror::Error;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Lifecycle operation that was being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Creating a pool.
    Create,
    /// Refreshing tracked state.
    Read,
    /// Applying drift corrections.
    Update,
    /// Removing a pool.
    Delete,
    /// Reading an untracked pool.
    Lookup,
    /// Adopting an existing pool into tracked state.
    Import,
}

impl Operation {
    /// Verb used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Lookup => "look up",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in lifecycle operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The desired state is invalid.
    #[error("invalid pool spec: {0}")]
    Invalid(#[from] CoreError),

    /// The change touches an immutable field and needs destroy + recreate.
    #[error("cannot change {field} of pool {name:?} in place: the pool must be replaced")]
    RequiresReplacement {
        /// Pool name as currently tracked.
        name: String,
        /// Immutable field that differs (`name` or `pool_type`).
        field: &'static str,
    },

    /// A remote call failed.
    #[error("could not {operation} pool {name:?}: {source}")]
    Operation {
        /// Operation being attempted.
        operation: Operation,
        /// Pool name.
        name: String,
        /// Client failure, with status and body when the API answered.
        #[source]
        source: ClientError,
    },
}

impl ControlError {
    /// Build a mapper that wraps a client error for `operation` on `name`.
    pub(crate) fn during(operation: Operation, name: &str) -> impl FnOnce(ClientError) -> Self + '_ {
        move |source| Self::Operation {
            operation,
            name: name.to_string(),
            source,
        }
    }

    /// The underlying client error, if a remote call failed.
    #[must_use]
    pub const fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Operation { source, .. } => Some(source),
            Self::Invalid(_) | Self::RequiresReplacement { .. } => None,
        }
    }

    /// HTTP status returned by the API, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.client_error().and_then(ClientError::status)
    }

    /// Returns true if the remote reported the pool as absent.
    ///
    /// A declarative caller treats this as success for a delete.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.client_error().is_some_and(ClientError::is_not_found)
    }

    /// Returns true if re-running the operation might succeed.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        self.client_error().is_some_and(ClientError::is_retriable)
    }
}
