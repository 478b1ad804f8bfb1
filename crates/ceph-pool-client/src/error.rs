//! Client error types.

use ceph_pool_core::CoreError;
use thiserror::Error;

/// A result type using `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced by a single control-plane call.
///
/// The client never retries or recovers on its own; every failure maps to
/// exactly one of these variants.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Login was rejected, or a fresh token was rejected again.
    #[error("authentication failed with status {status}: {body}")]
    Authentication {
        /// HTTP status returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request never produced a response (connect failure, TLS, timeout).
    #[error("{operation} request failed: {source}")]
    Transport {
        /// Which call was in flight.
        operation: &'static str,
        /// Underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// The pool does not exist.
    #[error("pool {name:?} not found")]
    PoolNotFound {
        /// Pool name.
        name: String,
    },

    /// The API refused to create the pool.
    #[error("failed to create pool {name:?} with status {status}: {body}")]
    PoolCreate {
        /// Pool name.
        name: String,
        /// HTTP status returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The API failed to return the pool.
    #[error("failed to get pool {name:?} with status {status}: {body}")]
    PoolRead {
        /// Pool name.
        name: String,
        /// HTTP status returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The API refused to delete the pool.
    #[error("failed to delete pool {name:?} with status {status}: {body}")]
    PoolDelete {
        /// Pool name.
        name: String,
        /// HTTP status returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The API refused a property or application change.
    #[error("failed to set {property} on pool {name:?} with status {status}: {body}")]
    PropertyUpdate {
        /// Pool name.
        name: String,
        /// Property being changed (`pg_num`, `size`, `application`, ...).
        property: String,
        /// HTTP status returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A success response carried a body we could not decode.
    #[error("failed to decode {operation} response: {message}")]
    Decode {
        /// Which call returned the body.
        operation: &'static str,
        /// Decoder message.
        message: String,
    },

    /// The pool name cannot address a single pool.
    #[error("invalid pool name: {0}")]
    InvalidName(#[from] CoreError),

    /// The client could not be constructed from its configuration.
    #[error("invalid client configuration: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// HTTP status carried by the error, if the API answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. }
            | Self::PoolCreate { status, .. }
            | Self::PoolRead { status, .. }
            | Self::PoolDelete { status, .. }
            | Self::PropertyUpdate { status, .. } => Some(*status),
            Self::PoolNotFound { .. } => Some(404),
            Self::Transport { .. }
            | Self::Decode { .. }
            | Self::InvalidName(_)
            | Self::Config(_) => None,
        }
    }

    /// Returns true if the remote reported that the pool does not exist.
    ///
    /// Covers both the distinguished not-found from a get and a 404 from any
    /// other pool call, such as a delete of an already-removed pool.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::PoolNotFound { .. })
            || matches!(self.status(), Some(404))
    }

    /// Returns true if running the operation again might succeed.
    ///
    /// Authentication failures are transient: the session is left
    /// unauthenticated and the next call logs in again.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Authentication { .. } => true,
            Self::PoolCreate { status, .. }
            | Self::PoolRead { status, .. }
            | Self::PoolDelete { status, .. }
            | Self::PropertyUpdate { status, .. } => *status >= 500,
            Self::PoolNotFound { .. }
            | Self::Decode { .. }
            | Self::InvalidName(_)
            | Self::Config(_) => false,
        }
    }
}

/// Errors in the client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required settings are empty.
    #[error("missing required settings: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// The endpoint is not an absolute http(s) URL.
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A timeout is zero, which would fail every request immediately.
    #[error("{setting} must be greater than zero")]
    ZeroTimeout {
        /// Offending setting.
        setting: &'static str,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
