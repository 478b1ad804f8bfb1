//! Results of lifecycle operations.
//!
//! These types make the orchestrator-facing contract structural: partial
//! creation, removal-on-not-found and the reconcile decision are variants,
//! not log lines.

use std::fmt;

use ceph_pool_core::PoolObserved;
use serde::{Deserialize, Serialize};

use crate::diff::PoolChange;

/// Non-fatal problem during create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWarning {
    /// Application tag that could not be set.
    pub application: String,
    /// Rendered client error.
    pub message: String,
}

impl fmt::Display for CreateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pool created but could not set application {:?}: {}",
            self.application, self.message
        )
    }
}

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Pool created and fully configured.
    Created(PoolObserved),
    /// Pool created, but the application tag step failed.
    CreatedWithWarning {
        /// The created pool. `application` reflects the requested tag.
        pool: PoolObserved,
        /// What went wrong.
        warning: CreateWarning,
    },
}

impl CreateOutcome {
    /// The created pool.
    #[must_use]
    pub const fn pool(&self) -> &PoolObserved {
        match self {
            Self::Created(pool) | Self::CreatedWithWarning { pool, .. } => pool,
        }
    }

    /// The warning, if the create was only partially successful.
    #[must_use]
    pub const fn warning(&self) -> Option<&CreateWarning> {
        match self {
            Self::Created(_) => None,
            Self::CreatedWithWarning { warning, .. } => Some(warning),
        }
    }

    /// Consume the outcome, keeping the pool.
    #[must_use]
    pub fn into_pool(self) -> PoolObserved {
        match self {
            Self::Created(pool) | Self::CreatedWithWarning { pool, .. } => pool,
        }
    }
}

/// Result of refreshing a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The pool exists; here is its current state.
    Present(PoolObserved),
    /// The pool no longer exists and should be dropped from tracked state.
    Gone,
}

impl ReadOutcome {
    /// Returns true if the pool no longer exists.
    #[must_use]
    pub const fn is_gone(&self) -> bool {
        matches!(self, Self::Gone)
    }

    /// The observed pool, or `None` if it is gone.
    #[must_use]
    pub fn into_observed(self) -> Option<PoolObserved> {
        match self {
            Self::Present(pool) => Some(pool),
            Self::Gone => None,
        }
    }
}

/// Result of a delete that tolerates an absent pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The pool was removed.
    Deleted,
    /// The pool was already gone.
    AlreadyAbsent,
}

/// What reconciliation will do for one pool.
///
/// Every variant except `Create` borrows the tracked record it was planned
/// against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan<'a> {
    /// No tracked state: create the pool.
    Create,
    /// Apply these in-place changes.
    Update {
        /// Tracked state being corrected.
        prior: &'a PoolObserved,
        /// Corrections, in application order.
        changes: Vec<PoolChange>,
    },
    /// An immutable field changed: destroy and recreate.
    Replace {
        /// Tracked state of the pool to destroy.
        prior: &'a PoolObserved,
        /// Field forcing replacement.
        field: &'static str,
    },
    /// Already converged.
    Noop(&'a PoolObserved),
}

/// What reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The pool was created.
    Created(CreateOutcome),
    /// The pool was updated in place and re-read.
    Updated(PoolObserved),
    /// The old pool was removed and a new one created.
    Replaced(CreateOutcome),
    /// Nothing needed to change.
    Unchanged(PoolObserved),
}

impl ReconcileOutcome {
    /// The pool state to track after reconciliation.
    #[must_use]
    pub const fn pool(&self) -> &PoolObserved {
        match self {
            Self::Created(outcome) | Self::Replaced(outcome) => outcome.pool(),
            Self::Updated(pool) | Self::Unchanged(pool) => pool,
        }
    }

    /// The create warning, if a create step was only partially successful.
    #[must_use]
    pub const fn warning(&self) -> Option<&CreateWarning> {
        match self {
            Self::Created(outcome) | Self::Replaced(outcome) => outcome.warning(),
            Self::Updated(_) | Self::Unchanged(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_outcome_accessors() {
        let pool = PoolObserved::named("pool-b");
        let outcome = CreateOutcome::CreatedWithWarning {
            pool: pool.clone(),
            warning: CreateWarning {
                application: "rbd".to_string(),
                message: "status 500".to_string(),
            },
        };

        assert_eq!(outcome.pool(), &pool);
        assert!(outcome.warning().unwrap().to_string().contains("\"rbd\""));
        assert_eq!(outcome.into_pool(), pool);

        assert!(CreateOutcome::Created(PoolObserved::named("x")).warning().is_none());
    }

    #[test]
    fn read_outcome_accessors() {
        assert!(ReadOutcome::Gone.is_gone());
        assert!(ReadOutcome::Gone.into_observed().is_none());

        let present = ReadOutcome::Present(PoolObserved::named("pool-a"));
        assert!(!present.is_gone());
        assert_eq!(present.into_observed().unwrap().name, "pool-a");
    }

    #[test]
    fn reconcile_outcome_pool() {
        let created = ReconcileOutcome::Replaced(CreateOutcome::Created(PoolObserved::named("p")));
        assert_eq!(created.pool().name, "p");
        assert!(created.warning().is_none());

        let unchanged = ReconcileOutcome::Unchanged(PoolObserved::named("q"));
        assert_eq!(unchanged.pool().name, "q");
    }
}
