//! osaudit Core - snapshot diff and classification engine
//!
//! This crate compares two point-in-time OS audit snapshots and reports
//! what changed, including:
//! - Typed NDJSON record model and line-addressed stream reader
//! - Type grouping index over a record stream
//! - Probe classification tables (severity, topic, expected exit codes)
//! - Probe-failure differ with deterministic ordering and topic grouping
//! - Aggregate delta emitters for storage, counts, security toggles,
//!   package counts and warnings
//! - Markdown change report and NDJSON diff-row renderers

pub mod classify;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod record;

// Re-export commonly used types
pub use classify::{ClassificationTables, ExpectedState, Severity};
pub use diff::{compute_diff, render_human_summary, render_ndjson, run, SnapshotDiff};
pub use errors::{ExError, ExErrorKind, OsAuditError, Result};
pub use record::{read_records, read_stream, Record};
