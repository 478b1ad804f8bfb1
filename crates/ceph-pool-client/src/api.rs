//! The pool API seam and its wire types.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use ceph_pool_core::{PoolType, ResolvedPool};
use serde::Serialize;

use crate::error::Result;

/// A pool as returned by `GET /api/pool/{name}`.
///
/// The dashboard's response shape varies between releases, so it is kept as
/// a generic JSON object and decoded field by field by the caller.
pub type PoolRecord = serde_json::Map<String, serde_json::Value>;

/// Request body for `POST /api/pool`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePoolRequest {
    /// Pool name.
    pub pool: String,
    /// Pool type.
    pub pool_type: PoolType,
    /// Placement-group count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_num: Option<u32>,
    /// Placement-group-for-placement count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pgp_num: Option<u32>,
    /// Replication size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Application tag, omitted when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
}

impl From<&ResolvedPool> for CreatePoolRequest {
    fn from(pool: &ResolvedPool) -> Self {
        Self {
            pool: pool.name.clone(),
            pool_type: pool.pool_type,
            pg_num: Some(pool.pg_num),
            pgp_num: Some(pool.pgp_num),
            size: Some(pool.size),
            application: pool.application.clone(),
        }
    }
}

/// Numeric pool properties that can be changed in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolProperty {
    /// `pg_num`
    PgNum,
    /// `pgp_num`
    PgpNum,
    /// `size`
    Size,
}

impl PoolProperty {
    /// Wire name of the property.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PgNum => "pg_num",
            Self::PgpNum => "pgp_num",
            Self::Size => "size",
        }
    }
}

impl fmt::Display for PoolProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for pool control-plane communication.
///
/// This trait abstracts the client interface, allowing for mock
/// implementations in tests. Implementations issue exactly one substantive
/// request per call and never retry on their own.
#[async_trait]
pub trait PoolApi: Send + Sync {
    /// Log in and store a fresh bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Authentication` if the credentials are rejected.
    async fn authenticate(&self) -> Result<()>;

    /// Create a pool.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::PoolCreate` unless the API answers 200 or 201.
    async fn create_pool(&self, request: &CreatePoolRequest) -> Result<()>;

    /// Fetch a pool by name.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::PoolNotFound` on 404 and `ClientError::PoolRead`
    /// on any other non-200 status.
    async fn get_pool(&self, name: &str) -> Result<PoolRecord>;

    /// Delete a pool by name.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::PoolDelete` unless the API answers 200, 202 or 204.
    async fn delete_pool(&self, name: &str) -> Result<()>;

    /// Change one numeric property of a pool.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::PropertyUpdate` on any non-2xx status.
    async fn set_pool_property(&self, name: &str, property: PoolProperty, value: u32)
        -> Result<()>;

    /// Set the application tag of a pool.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::PropertyUpdate` on any non-2xx status.
    async fn set_application(&self, name: &str, application: &str) -> Result<()>;
}

#[async_trait]
impl<T: PoolApi + ?Sized> PoolApi for Arc<T> {
    async fn authenticate(&self) -> Result<()> {
        (**self).authenticate().await
    }

    async fn create_pool(&self, request: &CreatePoolRequest) -> Result<()> {
        (**self).create_pool(request).await
    }

    async fn get_pool(&self, name: &str) -> Result<PoolRecord> {
        (**self).get_pool(name).await
    }

    async fn delete_pool(&self, name: &str) -> Result<()> {
        (**self).delete_pool(name).await
    }

    async fn set_pool_property(
        &self,
        name: &str,
        property: PoolProperty,
        value: u32,
    ) -> Result<()> {
        (**self).set_pool_property(name, property, value).await
    }

    async fn set_application(&self, name: &str, application: &str) -> Result<()> {
        (**self).set_application(name, application).await
    }
}
