//! Machine-readable diff rows.
//!
//! One JSON object per line, each `{"type":"diff","diff_type":...}`. A diff
//! without changes renders as the empty string.

use serde_json::{json, Map, Value};

use crate::diff::format::SpanKind;
use crate::diff::model::{ProbeEntry, SnapshotDiff};

/// Build the diff rows in report order.
pub fn diff_rows(diff: &SnapshotDiff) -> Vec<Value> {
    let mut rows = Vec::new();

    for d in &diff.storage {
        rows.push(row(
            "storage",
            json!({
                "field": d.field,
                "baseline": d.baseline,
                "current": d.current,
                "delta": d.delta,
                "pct_change": round2(d.pct_change),
            }),
        ));
    }
    for d in &diff.counts {
        rows.push(row(
            "count",
            json!({
                "field": d.field,
                "baseline": d.baseline,
                "current": d.current,
                "delta": d.delta,
            }),
        ));
    }
    for c in &diff.security_config {
        rows.push(row(
            "security_config",
            json!({
                "field": c.field,
                "baseline": c.baseline,
                "current": c.current,
            }),
        ));
    }
    for d in &diff.homebrew {
        rows.push(row(
            "homebrew",
            json!({
                "field": d.field,
                "baseline": d.baseline,
                "current": d.current,
                "delta": d.delta,
            }),
        ));
    }
    if !diff.new_warnings.is_empty() {
        rows.push(row("new_warnings", json!({ "codes": diff.new_warnings })));
    }
    for e in &diff.probe_failures {
        rows.push(row("probe_failure", probe_fields(e)));
    }

    rows
}

/// Render the diff rows as NDJSON, one row per line.
pub fn render_ndjson(diff: &SnapshotDiff) -> String {
    diff_rows(diff)
        .iter()
        .map(|r| format!("{}\n", r))
        .collect()
}

fn probe_fields(e: &ProbeEntry) -> Value {
    let mut fields = json!({
        "status": e.status,
        "probe": e.probe,
        "topic": e.topic,
        "severity": e.severity,
        "expected_state": e.expected_state,
        "baseline_count": e.baseline.as_ref().map(|i| i.count),
        "current_count": e.current.as_ref().map(|i| i.count),
    });
    if let Some(curr) = &e.current {
        fields["exit_codes"] = string_keyed(curr.exit_codes.iter().map(|(k, v)| (*k, json!(v))));
        fields["span"] = json!(SpanKind::of(curr.count, curr.duration_ms).as_str());
    } else if let Some(base) = &e.baseline {
        fields["exit_codes"] = string_keyed(base.exit_codes.iter().map(|(k, v)| (*k, json!(v))));
    }
    if !e.exit_code_delta.is_empty() {
        fields["exit_code_delta"] =
            string_keyed(e.exit_code_delta.iter().map(|(k, v)| (*k, json!(v))));
    }
    fields
}

fn row(diff_type: &str, fields: Value) -> Value {
    let mut out = Map::new();
    out.insert("type".to_string(), json!("diff"));
    out.insert("diff_type".to_string(), json!(diff_type));
    if let Value::Object(rest) = fields {
        out.extend(rest);
    }
    Value::Object(out)
}

/// Exit codes go back to their textual keys at the serialization boundary.
fn string_keyed(pairs: impl Iterator<Item = (i64, Value)>) -> Value {
    Value::Object(pairs.map(|(k, v)| (k.to_string(), v)).collect())
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
