pub mod diff;
pub mod tables;

use std::path::Path;

use osaudit_core::classify::ClassificationTables;
use osaudit_core::errors::{ExError, OsAuditError};
use osaudit_core_types::RunId;

/// Built-in tables, or the built-ins overlaid with the YAML document at `path`.
pub fn load_tables(path: Option<&Path>, run_id: &RunId) -> Result<ClassificationTables, ExError> {
    let tables = match path {
        Some(p) => ClassificationTables::load_file(p).map_err(|e| with_run(e, run_id))?,
        None => ClassificationTables::builtin(),
    };
    tracing::debug!(entries = tables.entry_count(), "classification tables ready");
    Ok(tables)
}

/// Canonical error for the CLI boundary, tagged with this invocation's run.
pub fn with_run(err: OsAuditError, run_id: &RunId) -> ExError {
    ExError::from(err).with_run_id(run_id.clone())
}
