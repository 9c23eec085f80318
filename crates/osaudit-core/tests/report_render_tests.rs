//! Renderer tests: Markdown layout and NDJSON diff rows.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use osaudit_core::classify::ClassificationTables;
use osaudit_core::diff::{compute_diff, render_human_summary, render_ndjson};
use osaudit_core::record::read_stream;
use serde_json::{json, Value};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_rows() -> Vec<Value> {
    let base = read_stream(fixture("probe_diff_baseline.ndjson")).unwrap();
    let curr = read_stream(fixture("probe_diff_current.ndjson")).unwrap();
    let diff = compute_diff(&base, &curr, &ClassificationTables::builtin());
    render_ndjson(&diff)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_sections_in_fixed_order() {
    let base = read_stream(fixture("probe_diff_baseline.ndjson")).unwrap();
    let curr = read_stream(fixture("probe_diff_current.ndjson")).unwrap();
    let out = render_human_summary(&compute_diff(&base, &curr, &ClassificationTables::builtin()));

    let headers: Vec<&str> = out.lines().filter(|l| l.starts_with("## ")).collect();
    assert_eq!(
        headers,
        vec![
            "## Storage delta",
            "## Count changes",
            "## Security config changes",
            "## Homebrew delta",
            "## New warnings",
            "## Probe failures delta",
        ]
    );
}

#[test]
fn test_ndjson_rows_are_tagged_diff() {
    let rows = fixture_rows();
    assert!(!rows.is_empty());
    for row in &rows {
        assert_eq!(row["type"], "diff");
        assert!(row["diff_type"].is_string());
    }
}

#[test]
fn test_ndjson_storage_row() {
    let rows = fixture_rows();
    let downloads = rows
        .iter()
        .find(|r| r["diff_type"] == "storage" && r["field"] == "downloads_bytes")
        .unwrap();

    assert_eq!(downloads["baseline"], json!(2147483648.0));
    assert_eq!(downloads["current"], json!(1073741824.0));
    assert_eq!(downloads["delta"], json!(-1073741824.0));
    assert_eq!(downloads["pct_change"], json!(-50.0));
}

#[test]
fn test_ndjson_warning_row_lists_sorted_codes() {
    let rows = fixture_rows();
    let warnings: Vec<&Value> = rows
        .iter()
        .filter(|r| r["diff_type"] == "new_warnings")
        .collect();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["codes"], json!(["disk_nearly_full", "soft_failures"]));
}

#[test]
fn test_ndjson_probe_rows() {
    let rows = fixture_rows();
    let probes: Vec<&Value> = rows
        .iter()
        .filter(|r| r["diff_type"] == "probe_failure")
        .collect();

    let ids: Vec<&str> = probes.iter().map(|r| r["probe"].as_str().unwrap()).collect();
    assert_eq!(
        ids,
        vec![
            "config.fdesetup_status",
            "identity.dscl_list_users",
            "network.ifconfig_iface",
            "network.ifconfig_list",
            "network.scutil_dns",
            "network.lsof_listen",
            "execution.ps_list",
        ]
    );

    let fdesetup = probes[0];
    assert_eq!(fdesetup["status"], "changed");
    assert_eq!(fdesetup["severity"], "high");
    assert_eq!(fdesetup["topic"], "Security");
    assert_eq!(fdesetup["expected_state"], "mixed");
    assert_eq!(fdesetup["exit_code_delta"], json!({"255": 1}));

    let iface = probes[2];
    assert_eq!(iface["status"], "new");
    assert_eq!(iface["span"], "tight burst");
    assert_eq!(iface["exit_codes"], json!({"1": 5}));
    assert_eq!(iface["baseline_count"], Value::Null);

    let ps = probes[6];
    assert_eq!(ps["status"], "resolved");
    assert_eq!(ps["baseline_count"], json!(1));
}

#[test]
fn test_ndjson_empty_when_unchanged() {
    let base = read_stream(fixture("probe_diff_baseline.ndjson")).unwrap();
    let diff = compute_diff(&base, &base, &ClassificationTables::builtin());

    assert!(!diff.has_changes());
    assert_eq!(render_ndjson(&diff), "");
}

#[test]
fn test_structured_diff_serializes() {
    let base = read_stream(fixture("probe_diff_baseline.ndjson")).unwrap();
    let curr = read_stream(fixture("probe_diff_current.ndjson")).unwrap();
    let diff = compute_diff(&base, &curr, &ClassificationTables::builtin());

    let value = serde_json::to_value(&diff).unwrap();
    assert_eq!(value["counts"][0]["field"], "node_modules");
    assert_eq!(value["probe_failures"][0]["current"]["exit_codes"], json!({"1": 2, "255": 1}));
}
