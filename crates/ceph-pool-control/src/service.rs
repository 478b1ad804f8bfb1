//! Pool lifecycle controller.
//!
//! This module provides the `PoolLifecycle` trait and the `PoolController`
//! implementation that maps desired state onto [`PoolApi`] calls and maps the
//! remote record back onto observed state.

use async_trait::async_trait;
use ceph_pool_client::{ClientError, CreatePoolRequest, PoolApi};
use ceph_pool_core::{validate_name, PoolObserved, PoolSpec};

use crate::diff::{self, PoolChange};
use crate::error::{ControlError, Operation, Result};
use crate::lifecycle;
use crate::observe::observe;
use crate::types::{CreateOutcome, CreateWarning, DeleteOutcome, Plan, ReadOutcome, ReconcileOutcome};

/// Trait defining the pool lifecycle operations.
///
/// Each operation is a short sequential chain of remote calls. Nothing is
/// rolled back on failure; re-running reconciliation converges because every
/// property change is idempotent.
#[async_trait]
pub trait PoolLifecycle: Send + Sync {
    /// Create a pool from a desired-state record.
    ///
    /// A failure to set the application tag after the pool exists is
    /// reported as `CreateOutcome::CreatedWithWarning`, not as an error.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Invalid` for a bad spec, or
    /// `ControlError::Operation` if the pool could not be created.
    async fn create(&self, spec: &PoolSpec) -> Result<CreateOutcome>;

    /// Refresh tracked state from the remote.
    ///
    /// Returns `ReadOutcome::Gone` if the pool no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Operation` for any failure other than not-found.
    async fn read(&self, prior: &PoolObserved) -> Result<ReadOutcome>;

    /// Correct drift in mutable fields, then re-read the pool.
    ///
    /// Returns `prior` untouched, without any remote call, when nothing
    /// differs.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::RequiresReplacement` if `name` or `pool_type`
    /// differ, or the first failing call's error. Changes already applied
    /// stay applied.
    async fn update(&self, desired: &PoolSpec, prior: &PoolObserved) -> Result<PoolObserved>;

    /// Delete a pool without checking that it exists.
    ///
    /// # Errors
    ///
    /// Returns the raw delete error. Use [`ControlError::is_not_found`] to
    /// treat an absent pool as deleted, or call [`destroy`](Self::destroy).
    async fn delete(&self, name: &str) -> Result<()>;

    /// Read a pool that is not tracked.
    ///
    /// # Errors
    ///
    /// Unlike [`read`](Self::read), a missing pool is an error.
    async fn lookup(&self, name: &str) -> Result<PoolObserved>;

    /// Adopt an existing pool into tracked state by name.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Operation` for any failure other than not-found.
    async fn import(&self, name: &str) -> Result<ReadOutcome>;

    /// Delete a pool, treating an already-absent pool as success.
    ///
    /// # Errors
    ///
    /// Returns any delete error other than not-found.
    async fn destroy(&self, name: &str) -> Result<DeleteOutcome> {
        match self.delete(name).await {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(e) if e.is_not_found() => {
                tracing::info!(pool = %name, "Pool already absent");
                Ok(DeleteOutcome::AlreadyAbsent)
            }
            Err(e) => Err(e),
        }
    }

    /// Converge one pool to its declared state.
    ///
    /// Creates untracked pools, replaces pools whose immutable fields
    /// changed, and updates everything else in place.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever step failed.
    async fn reconcile(
        &self,
        desired: &PoolSpec,
        prior: Option<&PoolObserved>,
    ) -> Result<ReconcileOutcome> {
        match lifecycle::plan(desired, prior) {
            Plan::Create => Ok(ReconcileOutcome::Created(self.create(desired).await?)),
            Plan::Replace { prior, field } => {
                tracing::info!(pool = %prior.name, field, "Replacing pool");
                self.destroy(&prior.name).await?;
                Ok(ReconcileOutcome::Replaced(self.create(desired).await?))
            }
            Plan::Update { prior, .. } => {
                Ok(ReconcileOutcome::Updated(self.update(desired, prior).await?))
            }
            Plan::Noop(prior) => Ok(ReconcileOutcome::Unchanged(prior.clone())),
        }
    }
}

/// The pool lifecycle controller.
#[derive(Debug)]
pub struct PoolController<A: PoolApi> {
    api: A,
}

impl<A: PoolApi> PoolController<A> {
    /// Create a controller over a pool API client.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self { api }
    }

    /// Get a reference to the API client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Read `base.name` and overlay the result onto `base`.
    async fn refresh(&self, operation: Operation, base: &PoolObserved) -> Result<ReadOutcome> {
        validate_name(&base.name)?;

        match self.api.get_pool(&base.name).await {
            Ok(record) => Ok(ReadOutcome::Present(observe(base, &record))),
            Err(ClientError::PoolNotFound { .. }) => {
                tracing::warn!(pool = %base.name, %operation, "Pool no longer exists");
                Ok(ReadOutcome::Gone)
            }
            Err(e) => Err(ControlError::during(operation, &base.name)(e)),
        }
    }

    async fn apply_change(&self, name: &str, change: &PoolChange) -> Result<()> {
        let result = match change {
            PoolChange::Property { property, value } => {
                tracing::debug!(pool = %name, property = %property, value, "Setting pool property");
                self.api.set_pool_property(name, *property, *value).await
            }
            PoolChange::Application(application) => {
                tracing::debug!(pool = %name, application = %application, "Setting pool application");
                self.api.set_application(name, application).await
            }
        };
        result.map_err(ControlError::during(Operation::Update, name))
    }
}

#[async_trait]
impl<A: PoolApi> PoolLifecycle for PoolController<A> {
    async fn create(&self, spec: &PoolSpec) -> Result<CreateOutcome> {
        let resolved = spec.resolve()?;
        let request = CreatePoolRequest::from(&resolved);

        self.api
            .create_pool(&request)
            .await
            .map_err(ControlError::during(Operation::Create, &resolved.name))?;

        tracing::info!(
            pool = %resolved.name,
            pool_type = %resolved.pool_type,
            pg_num = resolved.pg_num,
            pgp_num = resolved.pgp_num,
            size = resolved.size,
            "Created pool"
        );

        let pool = PoolObserved::from(resolved);
        let Some(application) = pool.application().map(str::to_string) else {
            return Ok(CreateOutcome::Created(pool));
        };

        match self.api.set_application(&pool.name, &application).await {
            Ok(()) => Ok(CreateOutcome::Created(pool)),
            Err(e) => {
                tracing::warn!(
                    pool = %pool.name,
                    application = %application,
                    error = %e,
                    "Pool created but application could not be set"
                );
                Ok(CreateOutcome::CreatedWithWarning {
                    pool,
                    warning: CreateWarning {
                        application,
                        message: e.to_string(),
                    },
                })
            }
        }
    }

    async fn read(&self, prior: &PoolObserved) -> Result<ReadOutcome> {
        self.refresh(Operation::Read, prior).await
    }

    async fn update(&self, desired: &PoolSpec, prior: &PoolObserved) -> Result<PoolObserved> {
        desired.validate()?;
        lifecycle::ensure_updatable(desired, prior)?;

        let changes = diff::diff(desired, prior);
        if changes.is_empty() {
            tracing::debug!(pool = %prior.name, "Pool already matches desired state");
            return Ok(prior.clone());
        }

        for change in &changes {
            self.apply_change(&prior.name, change).await?;
        }

        tracing::info!(pool = %prior.name, changes = changes.len(), "Updated pool");

        match self.refresh(Operation::Update, &diff::apply(prior, &changes)).await? {
            ReadOutcome::Present(observed) => Ok(observed),
            ReadOutcome::Gone => Err(ControlError::during(Operation::Update, &prior.name)(
                ClientError::PoolNotFound {
                    name: prior.name.clone(),
                },
            )),
        }
    }

    async fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;

        self.api
            .delete_pool(name)
            .await
            .map_err(ControlError::during(Operation::Delete, name))?;

        tracing::info!(pool = %name, "Deleted pool");
        Ok(())
    }

    async fn lookup(&self, name: &str) -> Result<PoolObserved> {
        match self.refresh(Operation::Lookup, &PoolObserved::named(name)).await? {
            ReadOutcome::Present(observed) => Ok(observed),
            ReadOutcome::Gone => Err(ControlError::during(Operation::Lookup, name)(
                ClientError::PoolNotFound {
                    name: name.to_string(),
                },
            )),
        }
    }

    async fn import(&self, name: &str) -> Result<ReadOutcome> {
        self.refresh(Operation::Import, &PoolObserved::named(name)).await
    }
}
