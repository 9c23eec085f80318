//! Snapshot diff engine.
//!
//! Compares a baseline and a current record stream and produces a
//! structured, deterministic diff, rendered either as a Markdown change
//! report or as NDJSON diff rows.
//!
//! ## Entry point
//!
//! ```
//! use osaudit_core::classify::ClassificationTables;
//! use osaudit_core::diff::{compute_diff, render_human_summary};
//!
//! let tables = ClassificationTables::builtin();
//! let diff = compute_diff(&[], &[], &tables);
//! assert!(!diff.has_changes());
//! assert!(render_human_summary(&diff).contains("No changes detected"));
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce byte-identical output; every
//!   collection is ordered by key, never by hash.
//! - **No-op suppression**: a probe with the same count, exit-code
//!   distribution and expected-ness on both sides never appears.
//! - **Permissive input**: missing or mistyped fields skip the dependent
//!   line or section instead of failing.

pub mod aggregate;
pub mod engine;
pub mod format;
pub mod human_summary;
pub mod model;
pub mod ndjson;
pub mod probe;

pub use engine::{compute_diff, run};
pub use human_summary::render_human_summary;
pub use model::{ProbeEntry, ProbeStatus, SnapshotDiff};
pub use ndjson::render_ndjson;
