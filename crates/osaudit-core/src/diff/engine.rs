//! Snapshot diff computation engine.
//!
//! [`compute_diff`] turns two record streams into a [`SnapshotDiff`];
//! [`run`] additionally renders the Markdown report into a sink.

use std::io::Write;
use std::time::Instant;

use crate::classify::ClassificationTables;
use crate::diff::aggregate::{
    count_delta, homebrew_delta, new_warnings, security_config_delta, storage_delta,
};
use crate::diff::human_summary::render_human_summary;
use crate::diff::model::SnapshotDiff;
use crate::diff::probe::diff_probe_failures;
use crate::errors::{OsAuditError, Result};
use crate::record::{group_by_type, warning_codes, Record};
use crate::{log_op_end, log_op_error, log_op_start};

/// Compute the structured diff between two snapshots.
///
/// Pure: the result depends only on the two record sequences and the
/// tables. Sections are computed in report order (storage, counts,
/// security config, homebrew, new warnings, probe failures).
pub fn compute_diff(
    baseline: &[Record],
    current: &[Record],
    tables: &ClassificationTables,
) -> SnapshotDiff {
    log_op_start!(
        "compute_diff",
        baseline_records = baseline.len(),
        current_records = current.len()
    );
    let start = Instant::now();

    let base = group_by_type(baseline);
    let curr = group_by_type(current);

    let diff = SnapshotDiff {
        storage: storage_delta(base.storage(), curr.storage()),
        counts: count_delta(base.counts(), curr.counts()),
        security_config: security_config_delta(base.security_config(), curr.security_config()),
        homebrew: homebrew_delta(base.homebrew(), curr.homebrew()),
        new_warnings: new_warnings(&warning_codes(baseline), &warning_codes(current)),
        probe_failures: diff_probe_failures(base.probe_failures(), curr.probe_failures(), tables),
    };

    log_op_end!(
        "compute_diff",
        duration_ms = start.elapsed().as_millis() as u64,
        has_changes = diff.has_changes(),
        entry_count = diff.entry_count()
    );

    diff
}

/// Diff two snapshots and write the Markdown report to `sink`.
///
/// Returns whether any delta was found.
///
/// # Errors
///
/// `Output` if writing to the sink fails.
pub fn run<W: Write>(
    baseline: &[Record],
    current: &[Record],
    tables: &ClassificationTables,
    sink: &mut W,
) -> Result<bool> {
    let diff = compute_diff(baseline, current, tables);
    let report = render_human_summary(&diff);

    let start = Instant::now();
    sink.write_all(report.as_bytes())
        .and_then(|()| sink.flush())
        .map_err(|e| {
            let err = OsAuditError::from(e);
            log_op_error!(
                "render_report",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            err
        })?;

    Ok(diff.has_changes())
}
