//! Tables command
//!
//! Usage: osaudit tables [--tables <YAML>]

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use osaudit_core_types::RunId;

use super::{load_tables, with_run};

#[derive(Debug, Args)]
pub struct TablesArgs {
    /// Overlay to apply on the built-in tables (YAML)
    #[arg(long)]
    pub tables: Option<PathBuf>,
}

/// Execute tables command
pub fn execute(args: TablesArgs, run_id: &RunId) -> anyhow::Result<ExitCode> {
    let tables = load_tables(args.tables.as_deref(), run_id)?;
    let yaml = tables.to_yaml().map_err(|e| with_run(e, run_id))?;

    let mut out = io::stdout().lock();
    out.write_all(yaml.as_bytes())?;
    out.flush()?;

    Ok(ExitCode::SUCCESS)
}
