//! Diff command
//!
//! Usage: osaudit diff --baseline <PATH> --current <PATH> [--ndjson] [--tables <YAML>] [--output <FILE>]

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Args;
use osaudit_core::classify::ClassificationTables;
use osaudit_core::diff::{compute_diff, render_ndjson, run};
use osaudit_core::errors::OsAuditError;
use osaudit_core::record::{read_stream, Record};
use osaudit_core_types::RunId;

use super::{load_tables, with_run};

/// Exit status when the snapshots differ
const EXIT_CHANGES: u8 = 2;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Baseline snapshot (NDJSON)
    #[arg(long)]
    pub baseline: PathBuf,

    /// Current snapshot (NDJSON)
    #[arg(long)]
    pub current: PathBuf,

    /// Emit one JSON diff row per change instead of the Markdown report
    #[arg(long)]
    pub ndjson: bool,

    /// Classification tables overlay (YAML)
    #[arg(long)]
    pub tables: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute diff command
pub fn execute(args: DiffArgs, run_id: &RunId) -> anyhow::Result<ExitCode> {
    let tables = load_tables(args.tables.as_deref(), run_id)?;

    // Both streams must read completely before anything is rendered
    let baseline = read_stream(&args.baseline).map_err(|e| with_run(e, run_id))?;
    let current = read_stream(&args.current).map_err(|e| with_run(e, run_id))?;

    let changed = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create output file {}", path.display()))?;
            let mut sink = BufWriter::new(file);
            let changed = write_report(&baseline, &current, &tables, args.ndjson, &mut sink, run_id)?;
            tracing::info!(output = %path.display(), "report written");
            changed
        }
        None => {
            let stdout = io::stdout();
            let mut sink = stdout.lock();
            write_report(&baseline, &current, &tables, args.ndjson, &mut sink, run_id)?
        }
    };

    Ok(if changed {
        ExitCode::from(EXIT_CHANGES)
    } else {
        ExitCode::SUCCESS
    })
}

fn write_report<W: Write>(
    baseline: &[Record],
    current: &[Record],
    tables: &ClassificationTables,
    ndjson: bool,
    sink: &mut W,
    run_id: &RunId,
) -> anyhow::Result<bool> {
    if !ndjson {
        return Ok(run(baseline, current, tables, sink).map_err(|e| with_run(e, run_id))?);
    }

    let diff = compute_diff(baseline, current, tables);
    sink.write_all(render_ndjson(&diff).as_bytes())
        .and_then(|()| sink.flush())
        .map_err(|e| with_run(OsAuditError::from(e), run_id))?;
    Ok(diff.has_changes())
}
