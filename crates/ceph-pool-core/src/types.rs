//! Desired-state and observed-state pool records.
//!
//! [`PoolSpec`] is what the caller declares, [`ResolvedPool`] is a spec with
//! every default applied, and [`PoolObserved`] is the controller's view of the
//! remote pool after the last create or read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Placement-group count used when a `PoolSpec` leaves `pg_num` unset.
pub const DEFAULT_PG_NUM: u32 = 32;

/// Replication size used when a `PoolSpec` leaves `size` unset.
pub const DEFAULT_SIZE: u32 = 3;

/// Check that `name` can address a pool.
///
/// The name becomes a single URL path segment, so it must be non-blank, free
/// of `/`, and not a dot segment (`.` or `..`).
///
/// # Errors
///
/// Returns `CoreError::InvalidSpec` describing the problem.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CoreError::invalid_spec(name, "name must not be empty"));
    }
    if name.contains('/') {
        return Err(CoreError::invalid_spec(name, "name must not contain '/'"));
    }
    if matches!(name, "." | "..") {
        return Err(CoreError::invalid_spec(name, "name must not be a dot segment"));
    }
    Ok(())
}

/// Data-protection scheme of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    /// Full copies of every object.
    #[default]
    Replicated,
    /// Erasure-coded chunks.
    Erasure,
}

impl PoolType {
    /// Wire name used by the dashboard API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replicated => "replicated",
            Self::Erasure => "erasure",
        }
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "replicated" => Ok(Self::Replicated),
            "erasure" => Ok(Self::Erasure),
            other => Err(CoreError::InvalidPoolType(other.to_string())),
        }
    }
}

/// Desired state of a pool as declared by the caller.
///
/// Only `name` is required. Changing `name` or `pool_type` after creation
/// means destroying and recreating the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSpec {
    /// Pool name, the only addressing key.
    pub name: String,
    /// Replicated or erasure-coded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_type: Option<PoolType>,
    /// Placement-group count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pg_num: Option<u32>,
    /// Placement-group-for-placement count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pgp_num: Option<u32>,
    /// Replication size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Application tag (rbd, cephfs, rgw).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
}

impl PoolSpec {
    /// Create a spec with only the name set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pool_type: None,
            pg_num: None,
            pgp_num: None,
            size: None,
            application: None,
        }
    }

    /// Set the pool type.
    #[must_use]
    pub fn with_pool_type(mut self, pool_type: PoolType) -> Self {
        self.pool_type = Some(pool_type);
        self
    }

    /// Set the placement-group count.
    #[must_use]
    pub fn with_pg_num(mut self, pg_num: u32) -> Self {
        self.pg_num = Some(pg_num);
        self
    }

    /// Set the placement-group-for-placement count.
    #[must_use]
    pub fn with_pgp_num(mut self, pgp_num: u32) -> Self {
        self.pgp_num = Some(pgp_num);
        self
    }

    /// Set the replication size.
    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the application tag.
    #[must_use]
    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = Some(application.into());
        self
    }

    /// The application tag, if one is set and non-empty.
    ///
    /// An empty string is treated the same as no tag at all.
    #[must_use]
    pub fn requested_application(&self) -> Option<&str> {
        self.application.as_deref().filter(|app| !app.is_empty())
    }

    /// Check for values the cluster would reject outright.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSpec` if the name cannot address a single
    /// pool (see [`validate_name`]), or if any count is zero.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;

        for (field, value) in [
            ("pg_num", self.pg_num),
            ("pgp_num", self.pgp_num),
            ("size", self.size),
        ] {
            if value == Some(0) {
                return Err(CoreError::invalid_spec(
                    &self.name,
                    format!("{field} must be greater than zero"),
                ));
            }
        }

        Ok(())
    }

    /// Validate and apply defaults to every unset field.
    ///
    /// `pgp_num` defaults to the resolved `pg_num`, not to a constant.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSpec` if validation fails.
    pub fn resolve(&self) -> Result<ResolvedPool> {
        self.validate()?;

        let pg_num = self.pg_num.unwrap_or(DEFAULT_PG_NUM);
        Ok(ResolvedPool {
            name: self.name.clone(),
            pool_type: self.pool_type.unwrap_or_default(),
            pg_num,
            pgp_num: self.pgp_num.unwrap_or(pg_num),
            size: self.size.unwrap_or(DEFAULT_SIZE),
            application: self.requested_application().map(str::to_string),
        })
    }
}

/// A pool spec with all defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPool {
    /// Pool name.
    pub name: String,
    /// Pool type.
    pub pool_type: PoolType,
    /// Placement-group count.
    pub pg_num: u32,
    /// Placement-group-for-placement count.
    pub pgp_num: u32,
    /// Replication size.
    pub size: u32,
    /// Application tag, `None` when unset.
    pub application: Option<String>,
}

impl From<ResolvedPool> for PoolObserved {
    fn from(pool: ResolvedPool) -> Self {
        Self {
            name: pool.name,
            pool_type: Some(pool.pool_type),
            pg_num: Some(pool.pg_num),
            pgp_num: Some(pool.pgp_num),
            size: Some(pool.size),
            application: pool.application.unwrap_or_default(),
        }
    }
}

/// Canonical view of a remote pool.
///
/// Fields other than `name` stay `None` until a create or read supplies
/// them. An empty `application` means no tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolObserved {
    /// Pool name.
    pub name: String,
    /// Pool type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_type: Option<PoolType>,
    /// Placement-group count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pg_num: Option<u32>,
    /// Placement-group-for-placement count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pgp_num: Option<u32>,
    /// Replication size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Application tag; empty when unset.
    #[serde(default)]
    pub application: String,
}

impl PoolObserved {
    /// A record that knows nothing about the pool beyond its name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pool_type: None,
            pg_num: None,
            pgp_num: None,
            size: None,
            application: String::new(),
        }
    }

    /// The application tag, if set.
    #[must_use]
    pub fn application(&self) -> Option<&str> {
        if self.application.is_empty() {
            None
        } else {
            Some(&self.application)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_only_spec_resolves_defaults() {
        let resolved = PoolSpec::new("pool-a").resolve().unwrap();

        assert_eq!(resolved.pool_type, PoolType::Replicated);
        assert_eq!(resolved.pg_num, 32);
        assert_eq!(resolved.pgp_num, 32);
        assert_eq!(resolved.size, 3);
        assert!(resolved.application.is_none());
    }

    #[test]
    fn pgp_num_follows_explicit_pg_num() {
        let resolved = PoolSpec::new("pool-a").with_pg_num(128).resolve().unwrap();
        assert_eq!(resolved.pg_num, 128);
        assert_eq!(resolved.pgp_num, 128);

        let resolved = PoolSpec::new("pool-a")
            .with_pg_num(128)
            .with_pgp_num(64)
            .resolve()
            .unwrap();
        assert_eq!(resolved.pgp_num, 64);
    }

    #[test]
    fn empty_application_is_unset() {
        let spec = PoolSpec::new("pool-a").with_application("");
        assert!(spec.requested_application().is_none());
        assert!(spec.resolve().unwrap().application.is_none());

        let spec = PoolSpec::new("pool-a").with_application("rbd");
        assert_eq!(spec.requested_application(), Some("rbd"));
    }

    #[test]
    fn validation_rejects_bad_specs() {
        assert!(PoolSpec::new("").validate().is_err());
        assert!(PoolSpec::new("   ").validate().is_err());
        assert!(PoolSpec::new("a/b").validate().is_err());
        assert!(PoolSpec::new(".").validate().is_err());
        assert!(PoolSpec::new("..").validate().is_err());
        assert!(PoolSpec::new("pool").with_size(0).validate().is_err());
        assert!(PoolSpec::new("pool").with_pg_num(0).resolve().is_err());

        match PoolSpec::new("pool").with_pgp_num(0).validate() {
            Err(CoreError::InvalidSpec { name, reason }) => {
                assert_eq!(name, "pool");
                assert!(reason.contains("pgp_num"));
            }
            other => panic!("expected InvalidSpec, got {other:?}"),
        }
    }

    #[test]
    fn names_with_url_delimiters_are_valid() {
        // encoded as one path segment by the client
        assert!(validate_name("prod?x").is_ok());
        assert!(validate_name("prod#1").is_ok());
        assert!(validate_name("...").is_ok());
    }

    #[test]
    fn pool_type_parsing() {
        assert_eq!("replicated".parse::<PoolType>().unwrap(), PoolType::Replicated);
        assert_eq!("erasure".parse::<PoolType>().unwrap(), PoolType::Erasure);
        assert_eq!(
            "Replicated".parse::<PoolType>(),
            Err(CoreError::InvalidPoolType("Replicated".to_string()))
        );
        assert_eq!(PoolType::Erasure.to_string(), "erasure");
    }

    #[test]
    fn resolved_pool_becomes_observed() {
        let observed = PoolObserved::from(
            PoolSpec::new("pool-b")
                .with_application("rbd")
                .resolve()
                .unwrap(),
        );

        assert_eq!(observed.name, "pool-b");
        assert_eq!(observed.pool_type, Some(PoolType::Replicated));
        assert_eq!(observed.size, Some(3));
        assert_eq!(observed.application(), Some("rbd"));
    }

    #[test]
    fn observed_serializes_without_unknown_fields() {
        let observed = PoolObserved::named("pool-c");
        let json = serde_json::to_value(&observed).unwrap();

        assert_eq!(json, serde_json::json!({"name": "pool-c", "application": ""}));
        assert!(observed.application().is_none());
    }

    #[test]
    fn spec_deserializes_from_partial_document() {
        let spec: PoolSpec =
            serde_json::from_str(r#"{"name":"pool-d","pool_type":"erasure","size":2}"#).unwrap();

        assert_eq!(spec.pool_type, Some(PoolType::Erasure));
        assert_eq!(spec.size, Some(2));
        assert!(spec.pg_num.is_none());
    }
}
