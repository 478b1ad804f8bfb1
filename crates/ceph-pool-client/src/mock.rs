//! In-memory [`PoolApi`] for tests.
//!
//! `MockPoolApi` keeps pools in a map, records every call in order, and can be
//! told to fail a given operation with a chosen HTTP status.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::api::{CreatePoolRequest, PoolApi, PoolProperty, PoolRecord};
use crate::error::{ClientError, Result};

/// Body returned for injected failures.
pub const INJECTED_FAILURE: &str = "injected failure";

/// One recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `authenticate()`
    Authenticate,
    /// `create_pool(request)`
    CreatePool(CreatePoolRequest),
    /// `get_pool(name)`
    GetPool(String),
    /// `delete_pool(name)`
    DeletePool(String),
    /// `set_pool_property(name, property, value)`
    SetPoolProperty {
        /// Pool name.
        name: String,
        /// Property changed.
        property: PoolProperty,
        /// New value.
        value: u32,
    },
    /// `set_application(name, application)`
    SetApplication {
        /// Pool name.
        name: String,
        /// New application tag.
        application: String,
    },
}

impl MockCall {
    /// Returns true for calls that change remote state.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreatePool(_)
                | Self::DeletePool(_)
                | Self::SetPoolProperty { .. }
                | Self::SetApplication { .. }
        )
    }
}

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    /// `authenticate()`
    Authenticate,
    /// `create_pool()`
    CreatePool,
    /// `get_pool()`
    GetPool,
    /// `delete_pool()`
    DeletePool,
    /// `set_pool_property()`
    SetPoolProperty,
    /// `set_application()`
    SetApplication,
}

#[derive(Debug, Default)]
struct MockState {
    pools: BTreeMap<String, PoolRecord>,
    calls: Vec<MockCall>,
    failures: HashMap<MockOperation, u16>,
}

/// A mock pool API backed by an in-memory map.
#[derive(Debug, Default)]
pub struct MockPoolApi {
    state: Mutex<MockState>,
}

impl MockPoolApi {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock already holding one pool.
    #[must_use]
    pub fn with_pool(name: impl Into<String>, record: PoolRecord) -> Self {
        let mock = Self::new();
        mock.insert_pool(name, record);
        mock
    }

    /// Insert or replace a pool record.
    pub fn insert_pool(&self, name: impl Into<String>, record: PoolRecord) {
        self.state.lock().pools.insert(name.into(), record);
    }

    /// Current record of a pool, if it exists.
    #[must_use]
    pub fn pool(&self, name: &str) -> Option<PoolRecord> {
        self.state.lock().pools.get(name).cloned()
    }

    /// Make every later call of `operation` fail with `status`.
    pub fn fail(&self, operation: MockOperation, status: u16) {
        self.state.lock().failures.insert(operation, status);
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Build the record the dashboard would return for a freshly created pool.
    #[must_use]
    pub fn record_for(request: &CreatePoolRequest) -> PoolRecord {
        let mut record = PoolRecord::new();
        record.insert("pool_name".to_string(), json!(request.pool));
        record.insert("type".to_string(), json!(request.pool_type.as_str()));
        if let Some(pg_num) = request.pg_num {
            record.insert("pg_num".to_string(), json!(pg_num));
        }
        if let Some(pgp_num) = request.pgp_num {
            record.insert("pgp_num".to_string(), json!(pgp_num));
        }
        if let Some(size) = request.size {
            record.insert("size".to_string(), json!(size));
        }
        let applications = request
            .application
            .as_ref()
            .map_or_else(|| json!({}), |app| json!({ app.as_str(): {} }));
        record.insert("application_metadata".to_string(), applications);
        record
    }

    /// Record the call and return the injected failure status, if any.
    fn begin(&self, call: MockCall, operation: MockOperation) -> Option<u16> {
        let mut state = self.state.lock();
        state.calls.push(call);
        state.failures.get(&operation).copied()
    }
}

#[async_trait]
impl PoolApi for MockPoolApi {
    async fn authenticate(&self) -> Result<()> {
        match self.begin(MockCall::Authenticate, MockOperation::Authenticate) {
            Some(status) => Err(ClientError::Authentication {
                status,
                body: INJECTED_FAILURE.to_string(),
            }),
            None => Ok(()),
        }
    }

    async fn create_pool(&self, request: &CreatePoolRequest) -> Result<()> {
        let failure = self.begin(
            MockCall::CreatePool(request.clone()),
            MockOperation::CreatePool,
        );
        let create_error = |status: u16, body: &str| ClientError::PoolCreate {
            name: request.pool.clone(),
            status,
            body: body.to_string(),
        };

        if let Some(status) = failure {
            return Err(create_error(status, INJECTED_FAILURE));
        }

        let mut state = self.state.lock();
        if state.pools.contains_key(&request.pool) {
            return Err(create_error(400, "pool already exists"));
        }
        state
            .pools
            .insert(request.pool.clone(), Self::record_for(request));
        Ok(())
    }

    async fn get_pool(&self, name: &str) -> Result<PoolRecord> {
        if let Some(status) = self.begin(MockCall::GetPool(name.to_string()), MockOperation::GetPool)
        {
            if status == 404 {
                return Err(ClientError::PoolNotFound {
                    name: name.to_string(),
                });
            }
            return Err(ClientError::PoolRead {
                name: name.to_string(),
                status,
                body: INJECTED_FAILURE.to_string(),
            });
        }

        self.pool(name).ok_or_else(|| ClientError::PoolNotFound {
            name: name.to_string(),
        })
    }

    async fn delete_pool(&self, name: &str) -> Result<()> {
        let failure = self.begin(
            MockCall::DeletePool(name.to_string()),
            MockOperation::DeletePool,
        );
        let delete_error = |status: u16, body: &str| ClientError::PoolDelete {
            name: name.to_string(),
            status,
            body: body.to_string(),
        };

        if let Some(status) = failure {
            return Err(delete_error(status, INJECTED_FAILURE));
        }

        match self.state.lock().pools.remove(name) {
            Some(_) => Ok(()),
            None => Err(delete_error(404, "pool does not exist")),
        }
    }

    async fn set_pool_property(
        &self,
        name: &str,
        property: PoolProperty,
        value: u32,
    ) -> Result<()> {
        let failure = self.begin(
            MockCall::SetPoolProperty {
                name: name.to_string(),
                property,
                value,
            },
            MockOperation::SetPoolProperty,
        );
        update_pool(self, name, property.as_str(), failure, |record| {
            record.insert(property.as_str().to_string(), json!(value));
        })
    }

    async fn set_application(&self, name: &str, application: &str) -> Result<()> {
        let failure = self.begin(
            MockCall::SetApplication {
                name: name.to_string(),
                application: application.to_string(),
            },
            MockOperation::SetApplication,
        );
        update_pool(self, name, "application", failure, |record| {
            record.insert(
                "application_metadata".to_string(),
                json!({ application: {} }),
            );
        })
    }
}

fn update_pool(
    mock: &MockPoolApi,
    name: &str,
    property: &str,
    failure: Option<u16>,
    apply: impl FnOnce(&mut PoolRecord),
) -> Result<()> {
    let update_error = |status: u16, body: &str| ClientError::PropertyUpdate {
        name: name.to_string(),
        property: property.to_string(),
        status,
        body: body.to_string(),
    };

    if let Some(status) = failure {
        return Err(update_error(status, INJECTED_FAILURE));
    }

    let mut state = mock.state.lock();
    let record = state
        .pools
        .get_mut(name)
        .ok_or_else(|| update_error(404, "pool does not exist"))?;
    apply(record);
    Ok(())
}

/// Convenience for building a [`PoolRecord`] from a JSON literal in tests.
///
/// # Panics
///
/// Panics if `value` is not a JSON object.
#[must_use]
pub fn pool_record(value: Value) -> PoolRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("pool record must be a JSON object, got {other}"),
    }
}
