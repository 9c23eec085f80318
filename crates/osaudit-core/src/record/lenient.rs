//! Permissive field decoders for collector records.
//!
//! Collectors emit numbers as either integers or floats and occasionally
//! drop or mistype a field. None of that is an error for the diff engine:
//! each decoder here accepts any JSON value and coerces it to the field's
//! conservative default.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::record::model::ProbeFailureItem;

pub(crate) fn coerce_f64(v: &Value) -> Option<f64> {
    v.as_f64()
}

pub(crate) fn coerce_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

pub(crate) fn coerce_u64(v: &Value) -> u64 {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| if f > 0.0 { f as u64 } else { 0 }))
            .unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn coerce_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().map(|f| f != 0.0).unwrap_or(false)),
        _ => Some(false),
    }
}

/// Normalise a string-keyed exit-code map into integer keys.
///
/// Keys that are not decimal integers are dropped. Duplicate keys after
/// normalisation (`"01"` and `"1"`) are summed, saturating at `u64::MAX`.
pub(crate) fn normalize_exit_codes(v: &Value) -> BTreeMap<i64, u64> {
    let mut out = BTreeMap::new();
    if let Value::Object(map) = v {
        for (k, count) in map {
            if let Ok(code) = k.trim().parse::<i64>() {
                let slot = out.entry(code).or_insert(0u64);
                *slot = slot.saturating_add(coerce_u64(count));
            }
        }
    }
    out
}

pub(crate) fn opt_f64<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(coerce_f64(&v))
}

pub(crate) fn opt_i64<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(coerce_i64(&v))
}

pub(crate) fn u64_or_zero<'de, D>(d: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(coerce_u64(&v))
}

pub(crate) fn f64_or_zero<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(coerce_f64(&v).unwrap_or(0.0))
}

pub(crate) fn opt_bool<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(coerce_bool(&v))
}

pub(crate) fn opt_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(v.as_str().map(str::to_string))
}

/// Key presence marker: only invoked when the key exists, whatever its value.
pub(crate) fn present<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let _ = Value::deserialize(d)?;
    Ok(true)
}

pub(crate) fn exit_codes<'de, D>(d: D) -> Result<BTreeMap<i64, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(normalize_exit_codes(&v))
}

/// Probe items: non-objects and entries without a string `probe` are skipped.
pub(crate) fn probe_items<'de, D>(d: D) -> Result<Vec<ProbeFailureItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    let Value::Array(entries) = v else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .filter(|e| e.get("probe").map(Value::is_string).unwrap_or(false))
        .filter_map(|e| serde_json::from_value::<ProbeFailureItem>(e).ok())
        .collect())
}
