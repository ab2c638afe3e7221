//! Core domain logic for the forensic case ledger.
//! This crate is the single source of truth for case/pericia invariants.

pub mod export;
pub mod form;
mod fsio;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use export::report::{render_workbook, ReportRow, ReportTable, REPORT_HEADERS};
pub use export::summary::{build_summary_index, CaseSummary};
pub use form::fields::PericiaForm;
pub use form::parser::{parse_form, FormFields, NO_RESPONSE_PLACEHOLDER};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::case::{Case, Pericia, PericiaId};
pub use model::catalog::{
    rollup_estado, CatalogError, CatalogField, EstadoPericia, DEFAULT_CASE_TYPE, ESTADOS,
    SECCIONES,
};
pub use repo::case_repo::{
    CaseRepository, InMemoryCaseRepository, JsonFileCaseRepository, RepoError, RepoResult,
    DEFAULT_DATA_DIR,
};
pub use service::clock::{format_edit_timestamp, Clock, FixedClock, SystemClock};
pub use service::export_service::{
    ExportArtifacts, ExportError, ExportPaths, ExportReport, ExportService, DEFAULT_INDEX_FILE,
    DEFAULT_REPORT_FILE,
};
pub use service::ingest_service::{
    apply_mutation, EditStamp, IngestError, IngestOptions, IngestOutcome, IngestRequest,
    IngestService, Intent, TRIGGER_CREATE, TRIGGER_UPDATE, UNKNOWN_ACTOR,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
