//! Decoding remote pool records into observed state.
//!
//! The dashboard's pool payload is not a stable contract, so every field is
//! read independently. A missing or mistyped field leaves the prior value in
//! place instead of failing the read.

use ceph_pool_client::PoolRecord;
use ceph_pool_core::{PoolObserved, PoolType};
use serde_json::Value;

/// Overlay the fields present in `record` onto `prior`.
#[must_use]
pub fn observe(prior: &PoolObserved, record: &PoolRecord) -> PoolObserved {
    let mut observed = prior.clone();

    if let Some(pool_type) = record
        .get("type")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<PoolType>().ok())
    {
        observed.pool_type = Some(pool_type);
    }
    if let Some(pg_num) = count(record, "pg_num") {
        observed.pg_num = Some(pg_num);
    }
    if let Some(pgp_num) = count(record, "pgp_num") {
        observed.pgp_num = Some(pgp_num);
    }
    if let Some(size) = count(record, "size") {
        observed.size = Some(size);
    }
    if let Some(application) = record.get("application_metadata").and_then(application_tag) {
        observed.application = application;
    }

    observed
}

/// Pick one application tag out of `application_metadata`.
///
/// The remote may tag a pool with several applications; only one is kept.
/// For an object, the lexicographically smallest key wins so the choice does
/// not depend on map ordering. For an array, the first non-empty string wins.
#[must_use]
pub fn application_tag(metadata: &Value) -> Option<String> {
    match metadata {
        Value::Object(apps) => apps
            .keys()
            .filter(|app| !app.is_empty())
            .min()
            .cloned(),
        Value::Array(apps) => apps
            .iter()
            .filter_map(Value::as_str)
            .find(|app| !app.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Read a non-negative count that fits in `u32`.
///
/// Accepts integral floats (`32.0`) as some releases serialize counts that way.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(record: &PoolRecord, key: &str) -> Option<u32> {
    let value = record.get(key)?;
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }

    let n = value.as_f64()?;
    (n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&n)).then(|| n as u32)
}
