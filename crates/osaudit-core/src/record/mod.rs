//! Snapshot record model, NDJSON reader and type index.

mod lenient;
pub mod index;
pub mod model;
pub mod stream;

pub use index::{group_by_type, warning_codes, TypeIndex};
pub use model::{
    CountSummary, HomebrewSummary, ProbeFailureItem, ProbeFailuresSummary, Record,
    SecurityConfig, StorageSummary, Warning,
};
pub use stream::{read_records, read_stream, MAX_LINE_BYTES};
