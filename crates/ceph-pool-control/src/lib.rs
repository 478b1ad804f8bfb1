//! Lifecycle controller for declared Ceph pools.
//!
//! This crate maps a declared pool (a [`PoolSpec`]) onto calls against the
//! dashboard pool API, and maps the remote record back onto tracked state
//! (a [`PoolObserved`]). It is meant to be driven by a declarative
//! orchestrator that persists tracked state between runs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Orchestrator (tracked state)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       PoolController                        │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐   │
//! │  │   Create    │ │  Read /     │ │  Update / Delete    │   │
//! │  │  + app tag  │ │  observe    │ │  selective diff     │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                   ┌─────────────────────┐
//!                   │  PoolApi (client)   │
//!                   └─────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use ceph_pool_control::{
//!     ClientConfig, HttpPoolClient, PoolController, PoolLifecycle, PoolSpec,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpPoolClient::new(&ClientConfig::from_env())?;
//! let controller = PoolController::new(client);
//!
//! let spec = PoolSpec::new("pool-b").with_application("rbd");
//! let outcome = controller.create(&spec).await?;
//! if let Some(warning) = outcome.warning() {
//!     eprintln!("{warning}");
//! }
//!
//! let tracked = outcome.into_pool();
//! let tracked = controller.update(&spec.with_size(2), &tracked).await?;
//! println!("size is now {:?}", tracked.size);
//! # Ok(())
//! # }
//! ```
//!
//! # Reconciliation
//!
//! [`PoolLifecycle::reconcile`] picks one operation per pool:
//!
//! - no tracked state: create
//! - `name` or `pool_type` changed: destroy, then create
//! - explicitly set mutable fields drifted: update in place and re-read
//! - otherwise: nothing
//!
//! See the [`lifecycle`] module for the decision itself.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod diff;
pub mod error;
pub mod lifecycle;
pub mod observe;
pub mod service;
pub mod types;

pub use diff::PoolChange;
pub use error::{ControlError, Operation, Result};
pub use service::{PoolController, PoolLifecycle};
pub use types::{
    CreateOutcome, CreateWarning, DeleteOutcome, Plan, ReadOutcome, ReconcileOutcome,
};

pub use ceph_pool_client::{ClientConfig, ClientError, HttpPoolClient, PoolApi};
pub use ceph_pool_core::{PoolObserved, PoolSpec, PoolType};
