//! Core pool records for the ceph-pool reconciler.
//!
//! This crate provides the types exchanged between an orchestrator and the
//! lifecycle controller:
//!
//! - **Desired state**: [`PoolSpec`], with defaults applied by [`PoolSpec::resolve`]
//! - **Observed state**: [`PoolObserved`], the canonical view of a remote pool
//! - **Errors**: [`CoreError`] for specs the cluster would reject
//!
//! # Example
//!
//! ```
//! use ceph_pool_core::{PoolObserved, PoolSpec, PoolType};
//!
//! let resolved = PoolSpec::new("pool-a").resolve().unwrap();
//! assert_eq!(resolved.pool_type, PoolType::Replicated);
//! assert_eq!(resolved.pg_num, 32);
//!
//! let observed = PoolObserved::from(resolved);
//! assert_eq!(observed.size, Some(3));
//! assert!(observed.application().is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod types;

pub use error::{CoreError, Result};
pub use types::{
    validate_name, PoolObserved, PoolSpec, PoolType, ResolvedPool, DEFAULT_PG_NUM, DEFAULT_SIZE,
};
