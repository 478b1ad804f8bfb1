//! Reconcile planning for a single pool.
//!
//! This module decides which lifecycle operation moves tracked state to the
//! declared state.
//!
//! ```text
//!            tracked state?
//!             │
//!       none  │  some
//!   ┌─────────┴──────────┐
//!   ▼                    ▼
//! Create       name / pool_type changed?
//!                  │
//!             yes  │  no
//!          ┌───────┴────────┐
//!          ▼                ▼
//!       Replace       selective diff empty?
//!  (delete, create)         │
//!                      yes  │  no
//!                   ┌───────┴───────┐
//!                   ▼               ▼
//!                 Noop     Update (set props, re-read)
//! ```

use ceph_pool_core::{PoolObserved, PoolSpec};

use crate::diff;
use crate::error::{ControlError, Result};
use crate::types::Plan;

/// Decide how to converge `prior` to `desired`.
#[must_use]
pub fn plan<'a>(desired: &PoolSpec, prior: Option<&'a PoolObserved>) -> Plan<'a> {
    let Some(prior) = prior else {
        return Plan::Create;
    };

    if let Some(field) = diff::immutable_change(desired, prior) {
        return Plan::Replace { prior, field };
    }

    let changes = diff::diff(desired, prior);
    if changes.is_empty() {
        Plan::Noop(prior)
    } else {
        Plan::Update { prior, changes }
    }
}

/// Reject an in-place update that would touch an immutable field.
///
/// # Errors
///
/// Returns `ControlError::RequiresReplacement` naming the field.
pub fn ensure_updatable(desired: &PoolSpec, prior: &PoolObserved) -> Result<()> {
    match diff::immutable_change(desired, prior) {
        Some(field) => Err(ControlError::RequiresReplacement {
            name: prior.name.clone(),
            field,
        }),
        None => Ok(()),
    }
}
