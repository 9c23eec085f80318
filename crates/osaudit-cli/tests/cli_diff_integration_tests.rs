//! CLI diff integration tests
//!
//! Drive the built binary against the core crate's NDJSON fixtures and
//! check exit status, stdout and stderr.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../osaudit-core/tests/fixtures")
        .join(name)
}

fn osaudit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_osaudit-cli"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI")
}

fn path_arg(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn test_diff_with_changes_exits_2_and_prints_report() {
    let base = fixture("probe_diff_baseline.ndjson");
    let curr = fixture("probe_diff_current.ndjson");

    let output = osaudit(&["diff", "--baseline", path_arg(&base), "--current", path_arg(&curr)]);

    assert_eq!(output.status.code(), Some(2), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let expected = std::fs::read_to_string(fixture("probe_diff_expected.md")).unwrap();
    assert_eq!(stdout, expected);
}

#[test]
fn test_identical_snapshots_exit_0() {
    let base = fixture("probe_diff_baseline.ndjson");

    let output = osaudit(&["diff", "--baseline", path_arg(&base), "--current", path_arg(&base)]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No changes detected between baseline and current."));
}

#[test]
fn test_ndjson_mode_emits_diff_rows() {
    let base = fixture("probe_diff_baseline.ndjson");
    let curr = fixture("probe_diff_current.ndjson");

    let output = osaudit(&[
        "diff",
        "--baseline",
        path_arg(&base),
        "--current",
        path_arg(&curr),
        "--ndjson",
    ]);

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let rows: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(rows.iter().all(|r| r["type"] == "diff"));
    assert!(rows
        .iter()
        .any(|r| r["diff_type"] == "probe_failure" && r["probe"] == "network.ifconfig_iface"));
}

#[test]
fn test_missing_baseline_exits_1_with_error_on_stderr() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.ndjson");
    let curr = fixture("probe_diff_current.ndjson");

    let output = osaudit(&["diff", "--baseline", path_arg(&missing), "--current", path_arg(&curr)]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "no partial report on failure");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.lines().any(|l| l.starts_with("Error: ")),
        "stderr: {stderr}"
    );
    assert!(stderr.contains("ERR_STREAM_UNREADABLE"));
    assert!(stderr.contains("absent.ndjson"));
}

#[test]
fn test_malformed_current_reports_line() {
    let temp_dir = TempDir::new().unwrap();
    let bad = temp_dir.path().join("bad.ndjson");
    std::fs::write(&bad, "{\"type\":\"meta\"}\n[1,2]\n").unwrap();
    let base = fixture("probe_diff_baseline.ndjson");

    let output = osaudit(&["diff", "--baseline", path_arg(&base), "--current", path_arg(&bad)]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_INVALID_RECORD"));
    assert!(stderr.contains("(line: 2)"));
}

#[test]
fn test_output_flag_writes_file() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("report.md");
    let base = fixture("probe_diff_baseline.ndjson");
    let curr = fixture("probe_diff_current.ndjson");

    let output = osaudit(&[
        "diff",
        "--baseline",
        path_arg(&base),
        "--current",
        path_arg(&curr),
        "--output",
        path_arg(&out),
    ]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("## Storage delta\n"));
}

#[test]
fn test_tables_overlay_changes_classification() {
    let temp_dir = TempDir::new().unwrap();
    let tables = temp_dir.path().join("tables.yaml");
    std::fs::write(&tables, "severity_exact:\n  execution.ps_list: high\n").unwrap();
    let base = fixture("probe_diff_baseline.ndjson");
    let curr = fixture("probe_diff_current.ndjson");

    let output = osaudit(&[
        "diff",
        "--baseline",
        path_arg(&base),
        "--current",
        path_arg(&curr),
        "--ndjson",
        "--tables",
        path_arg(&tables),
    ]);

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let ps: serde_json::Value = stdout
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
        .find(|r| r["probe"] == "execution.ps_list")
        .unwrap();
    assert_eq!(ps["severity"], "high");
}

#[test]
fn test_invalid_tables_exit_1() {
    let temp_dir = TempDir::new().unwrap();
    let tables = temp_dir.path().join("tables.yaml");
    std::fs::write(&tables, "severity_exact:\n  execution.ps_list: critical\n").unwrap();
    let base = fixture("probe_diff_baseline.ndjson");

    let output = osaudit(&[
        "diff",
        "--baseline",
        path_arg(&base),
        "--current",
        path_arg(&base),
        "--tables",
        path_arg(&tables),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_INVALID_CONFIG"));
}

#[test]
fn test_tables_command_prints_builtin_yaml() {
    let output = osaudit(&["tables"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("severity_prefix:"));
    assert!(stdout.contains("config.fdesetup_status"));
}

#[test]
fn test_verbose_logs_go_to_stderr() {
    let base = fixture("probe_diff_baseline.ndjson");

    let output = osaudit(&[
        "--verbose",
        "diff",
        "--baseline",
        path_arg(&base),
        "--current",
        path_arg(&base),
    ]);

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("read_stream"));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("read_stream"));
}

#[test]
fn test_usage_error_exits_1_not_changes_code() {
    let curr = fixture("probe_diff_current.ndjson");

    let output = osaudit(&["diff", "--current", path_arg(&curr)]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--baseline"));

    let unknown = osaudit(&["snapshot"]);
    assert_eq!(unknown.status.code(), Some(1));
}

#[test]
fn test_help_exits_0() {
    let output = osaudit(&["diff", "--help"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("--baseline"));
}
