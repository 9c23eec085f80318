//! Aggregate delta emitters for the singleton summary records.
//!
//! Each emitter yields nothing when either side's record is absent; within
//! a record, a field absent on either side is skipped.

use std::collections::BTreeSet;

use crate::diff::model::{CountDelta, StorageDelta, ToggleChange};
use crate::record::{CountSummary, HomebrewSummary, SecurityConfig, StorageSummary};

/// Byte-size changes of the storage summary.
pub fn storage_delta(
    baseline: Option<&StorageSummary>,
    current: Option<&StorageSummary>,
) -> Vec<StorageDelta> {
    let (Some(base), Some(curr)) = (baseline, current) else {
        return Vec::new();
    };

    base.fields()
        .into_iter()
        .zip(curr.fields())
        .filter_map(|((field, b), (_, c))| {
            let (b, c) = (b?, c?);
            let delta = c - b;
            if delta == 0.0 {
                return None;
            }
            let pct_change = if b != 0.0 { delta / b * 100.0 } else { 0.0 };
            Some(StorageDelta {
                field: field.to_string(),
                baseline: b,
                current: c,
                delta,
                pct_change,
            })
        })
        .collect()
}

/// Item count changes.
pub fn count_delta(
    baseline: Option<&CountSummary>,
    current: Option<&CountSummary>,
) -> Vec<CountDelta> {
    match (baseline, current) {
        (Some(b), Some(c)) => integer_deltas(b.fields(), c.fields()),
        _ => Vec::new(),
    }
}

/// Package manager count changes.
pub fn homebrew_delta(
    baseline: Option<&HomebrewSummary>,
    current: Option<&HomebrewSummary>,
) -> Vec<CountDelta> {
    match (baseline, current) {
        (Some(b), Some(c)) => integer_deltas(b.fields(), c.fields()),
        _ => Vec::new(),
    }
}

/// Security toggles that flipped.
pub fn security_config_delta(
    baseline: Option<&SecurityConfig>,
    current: Option<&SecurityConfig>,
) -> Vec<ToggleChange> {
    let (Some(base), Some(curr)) = (baseline, current) else {
        return Vec::new();
    };

    base.fields()
        .into_iter()
        .zip(curr.fields())
        .filter_map(|((field, b), (_, c))| {
            let (b, c) = (b?, c?);
            (b != c).then(|| ToggleChange {
                field: field.to_string(),
                baseline: b,
                current: c,
            })
        })
        .collect()
}

/// Warning codes present now that never appeared in the baseline, sorted.
pub fn new_warnings(baseline: &BTreeSet<String>, current: &BTreeSet<String>) -> Vec<String> {
    current.difference(baseline).cloned().collect()
}

fn integer_deltas<const N: usize>(
    baseline: [(&'static str, Option<i64>); N],
    current: [(&'static str, Option<i64>); N],
) -> Vec<CountDelta> {
    baseline
        .into_iter()
        .zip(current)
        .filter_map(|((field, b), (_, c))| {
            let (b, c) = (b?, c?);
            let delta = c.saturating_sub(b);
            (delta != 0).then(|| CountDelta {
                field: field.to_string(),
                baseline: b,
                current: c,
                delta,
            })
        })
        .collect()
}
