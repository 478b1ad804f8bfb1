//! Selective diff between desired and observed state.
//!
//! Only fields the caller explicitly set are compared. An unset desired
//! field never produces a change, whatever the remote holds.

use ceph_pool_client::PoolProperty;
use ceph_pool_core::{PoolObserved, PoolSpec};

/// One in-place correction to a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolChange {
    /// Set a numeric property.
    Property {
        /// Property to set.
        property: PoolProperty,
        /// Desired value.
        value: u32,
    },
    /// Set the application tag.
    Application(String),
}

/// Name of the first immutable field that differs, if any.
///
/// `pool_type` only counts when both sides know it.
#[must_use]
pub fn immutable_change(desired: &PoolSpec, prior: &PoolObserved) -> Option<&'static str> {
    if desired.name != prior.name {
        return Some("name");
    }

    match (desired.pool_type, prior.pool_type) {
        (Some(want), Some(have)) if want != have => Some("pool_type"),
        _ => None,
    }
}

/// Corrections needed to move `prior` to `desired`, in application order.
///
/// Order is `pg_num`, `pgp_num`, `size`, then the application tag.
#[must_use]
pub fn diff(desired: &PoolSpec, prior: &PoolObserved) -> Vec<PoolChange> {
    let mut changes: Vec<PoolChange> = [
        (PoolProperty::PgNum, desired.pg_num, prior.pg_num),
        (PoolProperty::PgpNum, desired.pgp_num, prior.pgp_num),
        (PoolProperty::Size, desired.size, prior.size),
    ]
    .into_iter()
    .filter_map(|(property, want, have)| match want {
        Some(value) if have != Some(value) => Some(PoolChange::Property { property, value }),
        _ => None,
    })
    .collect();

    if let Some(application) = desired.requested_application() {
        if application != prior.application {
            changes.push(PoolChange::Application(application.to_string()));
        }
    }

    changes
}

/// `prior` with `changes` applied locally.
#[must_use]
pub fn apply(prior: &PoolObserved, changes: &[PoolChange]) -> PoolObserved {
    let mut next = prior.clone();
    for change in changes {
        match change {
            PoolChange::Property { property, value } => {
                let slot = match property {
                    PoolProperty::PgNum => &mut next.pg_num,
                    PoolProperty::PgpNum => &mut next.pgp_num,
                    PoolProperty::Size => &mut next.size,
                };
                *slot = Some(*value);
            }
            PoolChange::Application(application) => next.application.clone_from(application),
        }
    }
    next
}
