//! `pericias` command-line entry point.
//!
//! # Responsibility
//! - Read one issue submission (flags or `ISSUE_*` environment) and apply it.
//! - Rebuild the summary index and spreadsheet report on demand.
//!
//! Any error exits nonzero; ingestion never writes on failure.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pericias_core::{
    core_version, default_log_level, init_logging, ExportPaths, ExportService, IngestOptions,
    IngestRequest, IngestService, JsonFileCaseRepository, DEFAULT_DATA_DIR, DEFAULT_INDEX_FILE,
    DEFAULT_REPORT_FILE, UNKNOWN_ACTOR,
};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pericias", version)]
#[command(about = "Forensic case ledger: issue-form ingestion and report export", long_about = None)]
struct Cli {
    /// Log level (trace|debug|info|warn|error|off); defaults to warn
    #[arg(long, global = true, env = "PERICIAS_LOG_LEVEL")]
    log_level: Option<String>,
    /// Write rolling log files here instead of logging to stderr
    #[arg(long, global = true, env = "PERICIAS_LOG_DIR")]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply one issue-form submission to its case record
    Ingest(IngestArgs),
    /// Rebuild the summary index and the spreadsheet report
    Export(ExportArgs),
}

#[derive(Args)]
struct IngestArgs {
    /// Issue title; must contain AGREGAR or ACTUALIZAR
    #[arg(long, env = "ISSUE_TITLE", default_value = "")]
    title: String,
    /// Issue body (rendered form)
    #[arg(long, env = "ISSUE_BODY", default_value = "")]
    body: String,
    /// Read the issue body from a file, or `-` for stdin; overrides --body
    #[arg(long)]
    body_file: Option<PathBuf>,
    /// Submitter identity
    #[arg(long, env = "ISSUE_USER", default_value = UNKNOWN_ACTOR)]
    actor: String,
    /// Directory with one JSON record per case
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    /// Reject status/section values outside the catalog
    #[arg(long)]
    strict: bool,
}

#[derive(Args)]
struct ExportArgs {
    /// Directory with one JSON record per case
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    /// Summary index output
    #[arg(long, default_value = DEFAULT_INDEX_FILE)]
    index_file: PathBuf,
    /// Spreadsheet report output
    #[arg(long, default_value = DEFAULT_REPORT_FILE)]
    report_file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref(), cli.log_dir.as_deref())?;
    log::debug!(
        "event=cli_start module=cli status=ok version={}",
        core_version()
    );

    match cli.command {
        Commands::Ingest(args) => run_ingest(args),
        Commands::Export(args) => run_export(args),
    }
}

fn setup_logging(level: Option<&str>, log_dir: Option<&Path>) -> Result<()> {
    let level = level.unwrap_or(default_log_level());
    let log_dir = match log_dir {
        Some(dir) if dir.is_relative() => Some(std::env::current_dir()?.join(dir)),
        Some(dir) => Some(dir.to_path_buf()),
        None => None,
    };
    let log_dir = log_dir
        .as_deref()
        .map(|dir| dir.to_str().context("log directory must be valid UTF-8"))
        .transpose()?;

    init_logging(level, log_dir).map_err(anyhow::Error::msg)
}

fn read_body(args: &IngestArgs) -> Result<String> {
    match args.body_file.as_deref() {
        Some(path) if path == Path::new("-") => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read issue body from stdin")?;
            Ok(body)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read issue body from {}", path.display())),
        None => Ok(args.body.clone()),
    }
}

fn run_ingest(args: IngestArgs) -> Result<()> {
    let request = IngestRequest {
        title: args.title.clone(),
        body: read_body(&args)?,
        actor: args.actor.clone(),
    };

    let repo = JsonFileCaseRepository::new(args.data_dir.clone());
    let mut service = IngestService::new(repo).with_options(IngestOptions {
        strict_catalog: args.strict,
    });
    let outcome = service
        .ingest(&request)
        .context("Failed to apply issue submission")?;

    println!(
        "{} {} in case {}{}",
        outcome.intent.as_str(),
        outcome.pericia_id,
        outcome.caso,
        if outcome.case_created {
            " (new case)"
        } else {
            ""
        }
    );
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<()> {
    let service = ExportService::new(JsonFileCaseRepository::new(args.data_dir));
    let report = service
        .export(&ExportPaths {
            index_file: args.index_file,
            report_file: args.report_file,
        })
        .context("Failed to export case reports")?;

    println!(
        "exported {} cases / {} pericias to {} and {}",
        report.cases,
        report.rows,
        report.index_file.display(),
        report.report_file.display()
    );
    Ok(())
}
