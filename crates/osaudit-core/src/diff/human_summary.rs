//! Markdown change report renderer for snapshot diffs.

use crate::diff::format::{
    format_exit_code_delta, format_exit_codes, format_span, humanize_bytes, sign_of,
};
use crate::diff::model::{CountDelta, ProbeEntry, ProbeStatus, SnapshotDiff};
use crate::diff::probe::group_by_topic;

/// Printed when no section found a delta
pub const NO_CHANGES_LINE: &str = "No changes detected between baseline and current.";

/// Render the Markdown report of a [`SnapshotDiff`].
///
/// Sections appear in fixed order and are omitted when empty, except the
/// probe failures section which is always present. Output is a pure
/// function of the diff.
pub fn render_human_summary(diff: &SnapshotDiff) -> String {
    let mut out = String::new();

    if !diff.storage.is_empty() {
        out.push_str("## Storage delta\n");
        for d in &diff.storage {
            out.push_str(&format!(
                "  {}: {} → {} ({}{}, {:+.1}%)\n",
                d.display_name(),
                humanize_bytes(d.baseline),
                humanize_bytes(d.current),
                sign_of(d.delta),
                humanize_bytes(d.delta),
                d.pct_change
            ));
        }
        out.push('\n');
    }

    push_count_section(&mut out, "## Count changes", &diff.counts);

    if !diff.security_config.is_empty() {
        out.push_str("## Security config changes\n");
        for c in &diff.security_config {
            out.push_str(&format!(
                "  {}: {} → {}\n",
                c.field,
                on_off(c.baseline),
                on_off(c.current)
            ));
        }
        out.push('\n');
    }

    push_count_section(&mut out, "## Homebrew delta", &diff.homebrew);

    if !diff.new_warnings.is_empty() {
        out.push_str("## New warnings\n");
        for code in &diff.new_warnings {
            out.push_str(&format!("  - {}\n", code));
        }
        out.push('\n');
    }

    out.push_str("## Probe failures delta\n");
    if diff.probe_failures.is_empty() {
        out.push_str("  No changes detected\n");
    } else {
        for group in group_by_topic(&diff.probe_failures) {
            out.push_str(&format!("\n### {}\n", group.topic));
            for entry in group.entries {
                out.push_str(&probe_line(entry));
                out.push('\n');
            }
        }
    }
    out.push('\n');

    if !diff.has_changes() {
        out.push_str(NO_CHANGES_LINE);
        out.push('\n');
    }

    out
}

/// One report line for a probe entry, without the trailing newline.
pub fn probe_line(entry: &ProbeEntry) -> String {
    let suffix = entry.expected_state.suffix();
    match (entry.status, &entry.baseline, &entry.current) {
        (ProbeStatus::New, _, Some(curr)) => format!(
            "  + {} failed {}× ({}), exit_codes: {{{}}}{}",
            entry.probe,
            curr.count,
            format_span(curr),
            format_exit_codes(&curr.exit_codes),
            suffix
        ),
        (ProbeStatus::Resolved, Some(base), _) => format!(
            "  - {} resolved (was {}×, exit_codes: {{{}}}){}",
            entry.probe,
            base.count,
            format_exit_codes(&base.exit_codes),
            suffix
        ),
        _ => {
            let delta = format_exit_code_delta(&entry.exit_code_delta);
            if delta.is_empty() {
                format!(
                    "  ~ {} {}×→{}×{}",
                    entry.probe,
                    entry.baseline_count(),
                    entry.current_count(),
                    suffix
                )
            } else {
                format!(
                    "  ~ {} {}×→{}×, exit_codes: {}{}",
                    entry.probe,
                    entry.baseline_count(),
                    entry.current_count(),
                    delta,
                    suffix
                )
            }
        }
    }
}

fn push_count_section(out: &mut String, header: &str, deltas: &[CountDelta]) {
    if deltas.is_empty() {
        return;
    }
    out.push_str(header);
    out.push('\n');
    for d in deltas {
        let sign = if d.delta >= 0 { "+" } else { "" };
        out.push_str(&format!(
            "  {}: {} → {} ({}{})\n",
            d.field, d.baseline, d.current, sign, d.delta
        ));
    }
    out.push('\n');
}

fn on_off(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}
