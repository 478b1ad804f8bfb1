//! Authenticated client for the Ceph dashboard pool API.
//!
//! This crate provides the leaf of the reconciler:
//!
//! - A guarded login [`Session`] with lazy authentication and re-login when
//!   the remote rejects a token
//! - The [`PoolApi`] trait with one method per remote call
//! - [`HttpPoolClient`], the reqwest-backed implementation
//! - Typed [`ClientError`]s carrying the HTTP status and raw body
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │  PoolController  │────▶│     PoolApi      │
//! │  (ceph-pool-     │     │     (trait)      │
//! │   control)       │     └────────┬─────────┘
//! └──────────────────┘              │
//!                          ┌────────▼─────────┐
//!                          │  HttpPoolClient  │
//!                          └────────┬─────────┘
//!                                   │
//!                          ┌────────▼─────────┐
//!                          │     Session      │
//!                          │  (token state)   │
//!                          └────────┬─────────┘
//!                                   │ HTTPS
//!                          ┌────────▼─────────┐
//!                          │  Ceph dashboard  │
//!                          │  /api/auth       │
//!                          │  /api/pool       │
//!                          └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use ceph_pool_client::{ClientConfig, HttpPoolClient, PoolApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env();
//! let client = HttpPoolClient::new(&config)?;
//!
//! let pool = client.get_pool("rbd").await?;
//! println!("size: {:?}", pool.get("size"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use api::{CreatePoolRequest, PoolApi, PoolProperty, PoolRecord};
pub use config::{ClientConfig, ConfigOverrides};
pub use error::{ClientError, ConfigError, Result};
pub use http::HttpPoolClient;
pub use session::{Session, TokenState};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockCall, MockOperation, MockPoolApi};
