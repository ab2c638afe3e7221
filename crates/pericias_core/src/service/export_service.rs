//! Export use-case: summary index and spreadsheet report.
//!
//! # Responsibility
//! - Read every case once and rebuild both artifacts from scratch.
//!
//! # Invariants
//! - Both artifacts are replaced wholesale; nothing is merged with prior runs.
//! - Any unreadable case record aborts the export before anything is written.

use crate::export::report::{render_workbook, ReportTable};
use crate::export::summary::{build_summary_index, CaseSummary};
use crate::fsio::write_atomic;
use crate::repo::case_repo::{CaseRepository, RepoError};
use log::{error, info};
use rust_xlsxwriter::XlsxError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Default location of the summary index.
pub const DEFAULT_INDEX_FILE: &str = "data/index.json";
/// Default location of the spreadsheet report.
pub const DEFAULT_REPORT_FILE: &str = "web/exports/Matriz_Oficial.xlsx";

/// Export failure.
#[derive(Debug)]
pub enum ExportError {
    Repo(RepoError),
    Io { path: PathBuf, source: io::Error },
    Serde(serde_json::Error),
    Xlsx(XlsxError),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Serde(err) => write!(f, "failed to encode summary index: {err}"),
            Self::Xlsx(err) => write!(f, "failed to render report: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Serde(err) => Some(err),
            Self::Xlsx(err) => Some(err),
        }
    }
}

impl From<RepoError> for ExportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

impl From<XlsxError> for ExportError {
    fn from(value: XlsxError) -> Self {
        Self::Xlsx(value)
    }
}

/// Output locations for one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub index_file: PathBuf,
    pub report_file: PathBuf,
}

impl Default for ExportPaths {
    fn default() -> Self {
        Self {
            index_file: PathBuf::from(DEFAULT_INDEX_FILE),
            report_file: PathBuf::from(DEFAULT_REPORT_FILE),
        }
    }
}

/// In-memory export result, before anything touches disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifacts {
    pub index: Vec<CaseSummary>,
    pub table: ReportTable,
}

impl ExportArtifacts {
    /// Pretty-printed UTF-8 JSON of the summary index.
    pub fn index_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.index)
    }
}

/// Counts and locations reported after a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub cases: usize,
    pub rows: usize,
    pub index_file: PathBuf,
    pub report_file: PathBuf,
}

/// Export service over a case repository. Read-only towards the store.
pub struct ExportService<R: CaseRepository> {
    repo: R,
}

impl<R: CaseRepository> ExportService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Builds both projections from the current store contents.
    pub fn build(&self) -> Result<ExportArtifacts, ExportError> {
        let cases = self.repo.list_all()?;
        Ok(ExportArtifacts {
            index: build_summary_index(&cases),
            table: ReportTable::from_cases(&cases),
        })
    }

    /// Rebuilds and writes the summary index and the XLSX report.
    ///
    /// # Side effects
    /// - Overwrites both output files, creating parent directories.
    /// - Emits `export` logging events with counts and duration.
    pub fn export(&self, paths: &ExportPaths) -> Result<ExportReport, ExportError> {
        let started_at = Instant::now();
        let result = self.export_inner(paths);
        match &result {
            Ok(report) => info!(
                "event=export module=service status=ok cases={} rows={} duration_ms={}",
                report.cases,
                report.rows,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=export module=service status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn export_inner(&self, paths: &ExportPaths) -> Result<ExportReport, ExportError> {
        let artifacts = self.build()?;
        let index_json = artifacts.index_json()?;
        let workbook = render_workbook(&artifacts.table)?;

        write_artifact(&paths.index_file, index_json.as_bytes())?;
        write_artifact(&paths.report_file, &workbook)?;

        Ok(ExportReport {
            cases: artifacts.index.len(),
            rows: artifacts.table.len(),
            index_file: paths.index_file.clone(),
            report_file: paths.report_file.clone(),
        })
    }
}

fn write_artifact(path: &Path, payload: &[u8]) -> Result<(), ExportError> {
    write_atomic(path, payload).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
