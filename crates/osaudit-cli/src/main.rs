//! osaudit CLI
//!
//! Command-line interface for diffing two osaudit snapshots.
//!
//! Exit status of `diff`: 0 when nothing changed, 2 when changes were found,
//! 1 on any read, configuration, output or usage error.

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use osaudit_core::logging_facility::{self, Profile};
use osaudit_core_types::RunId;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "osaudit")]
#[command(about = "osaudit - Snapshot diff and probe failure classification", long_about = None)]
struct Cli {
    /// Human-readable debug logging on stderr
    #[arg(long, global = true, conflicts_with = "log_json")]
    verbose: bool,

    /// JSON structured logging on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn profile(&self) -> Profile {
        if self.verbose {
            Profile::Development
        } else if self.log_json {
            Profile::Production
        } else {
            Profile::Quiet
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare a baseline snapshot with a current one
    Diff(commands::diff::DiffArgs),
    /// Print the effective classification tables as YAML
    Tables(commands::tables::TablesArgs),
}

fn main() -> ExitCode {
    // clap's own usage exit code (2) would collide with "changes found"
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };
    logging_facility::init(cli.profile());

    let run_id = RunId::new();
    let span = tracing::info_span!("osaudit", run_id = %run_id);
    let _entered = span.enter();

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(args, &run_id),
        Commands::Tables(args) => commands::tables::execute(args, &run_id),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
