//! salesagg-generate: write a CSV of random sales records for manual testing.

use clap::Parser;
use salesagg_core::generate::{DEFAULT_ROWS, write_fake_csv};
use salesagg_core::logging;
use std::path::PathBuf;
use std::process::ExitCode;

/// Generate synthetic `name,age,city,sales` records
#[derive(Parser, Debug)]
#[command(name = "salesagg-generate", version, about, long_about = None)]
struct Cli {
    /// Output CSV file
    #[arg(short, long, default_value = "datasets/fake_data.csv")]
    output: PathBuf,

    /// Number of rows to generate
    #[arg(short = 'n', long, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { 1 } else { 0 });
        }
    };
    let _log = logging::init(logging::level_filter(cli.verbose, false), None);

    match write_fake_csv(&cli.output, cli.rows, cli.seed) {
        Ok(rows) => {
            println!(
                "Successfully generated {rows} rows into '{}'!",
                cli.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(kind = e.kind(), "{e}");
            ExitCode::from(1)
        }
    }
}
