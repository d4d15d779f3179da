//! salesagg CLI: validate a sales CSV, aggregate by city, write the summary to SQLite.
//!
//! Exits with status 0 on success and 1 on any fatal error.

mod display;

use anyhow::Context;
use clap::Parser;
use salesagg_core::logging;
use salesagg_core::persistence::atomic_write_json;
use salesagg_core::{ConfigOverrides, Pipeline, PipelineConfig, PipelineError, load_config};
use std::path::PathBuf;
use std::process::ExitCode;

/// Aggregate sales records by city into a SQLite table
#[derive(Parser, Debug)]
#[command(name = "salesagg", version, about, long_about = None)]
struct Cli {
    /// CSV input file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// SQLite database file (".db" is appended when missing)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Destination table, replaced on every run
    #[arg(short, long)]
    table: Option<String>,

    /// CSV field delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// Decimal places kept on aggregate values
    #[arg(long)]
    precision: Option<u32>,

    /// Rows read back from the table after writing
    #[arg(long)]
    read_back: Option<usize>,

    /// Workspace directory searched for salesagg.toml
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path (replaces the workspace salesagg.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for JSON log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors and skip the printed tables
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_path: self.input.clone(),
            delimiter: self.delimiter,
            db_path: self.db.clone(),
            table_name: self.table.clone(),
            read_back_limit: self.read_back,
            precision: self.precision,
            log_dir: self.log_dir.clone(),
        }
    }
}

fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_failure_code(&e));
        }
    };

    let config = load_config(Some(&cli.workspace), cli.config.as_deref(), &cli.overrides());
    let log_dir = config.as_ref().ok().and_then(|c| c.log_dir.clone());
    let _log = logging::init(
        logging::level_filter(cli.verbose, cli.quiet),
        log_dir.as_deref(),
    );

    let result = config
        .map_err(anyhow::Error::from)
        .and_then(|config| run(config, &cli));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let kind = e
                .downcast_ref::<PipelineError>()
                .map_or("error", PipelineError::kind);
            tracing::error!(kind, "{e:#}");
            ExitCode::from(1)
        }
    }
}

/// Help and version requests succeed; every other parse error is fatal.
fn parse_failure_code(e: &clap::Error) -> u8 {
    if e.use_stderr() { 1 } else { 0 }
}

fn run(config: PipelineConfig, cli: &Cli) -> anyhow::Result<()> {
    let precision = config.precision;
    let mut pipeline = Pipeline::new(config);
    let summary = pipeline.run()?;

    if !cli.quiet {
        println!("\nData Preview:");
        println!("{}", display::render_table(&summary.columns, &summary.preview));
        println!(
            "\nValidated {} of {} rows ({} dropped).",
            summary.validation.valid_rows, summary.rows_read, summary.validation.invalid_rows
        );
        println!("\nAggregation Results:");
        println!("{}", display::render_aggregates(&summary.results, precision));
    }

    if let Some(path) = &cli.summary_json {
        atomic_write_json(path, &summary)
            .with_context(|| format!("writing run summary to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Run summary written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::try_parse_from([
            "salesagg",
            "--input",
            "in.csv",
            "--db",
            "out",
            "-t",
            "city_totals",
            "--precision",
            "3",
            "-vv",
        ])
        .unwrap();
        let o = cli.overrides();
        assert_eq!(o.input_path, Some(PathBuf::from("in.csv")));
        assert_eq!(o.db_path, Some(PathBuf::from("out")));
        assert_eq!(o.table_name.as_deref(), Some("city_totals"));
        assert_eq!(o.precision, Some(3));
        assert_eq!(o.read_back_limit, None);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["salesagg"]).unwrap();
        assert_eq!(cli.workspace, PathBuf::from("."));
        assert!(cli.overrides().input_path.is_none());
        assert!(!cli.quiet);
    }

    #[test]
    fn test_bad_argument_exits_with_one() {
        let err = Cli::try_parse_from(["salesagg", "--precision", "abc"]).unwrap_err();
        assert_eq!(parse_failure_code(&err), 1);

        let err = Cli::try_parse_from(["salesagg", "--no-such-flag"]).unwrap_err();
        assert_eq!(parse_failure_code(&err), 1);
    }

    #[test]
    fn test_help_and_version_exit_with_zero() {
        let err = Cli::try_parse_from(["salesagg", "--help"]).unwrap_err();
        assert_eq!(parse_failure_code(&err), 0);

        let err = Cli::try_parse_from(["salesagg", "--version"]).unwrap_err();
        assert_eq!(parse_failure_code(&err), 0);
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
