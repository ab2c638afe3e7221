//! Issue-form ingestion use-case.
//!
//! # Responsibility
//! - Derive the mutation intent from an issue title.
//! - Apply one create/update mutation to one case.
//! - Persist the whole case back through the repository.
//!
//! # Invariants
//! - The mutation is computed in memory first; failures never reach `save`.
//! - Pericia ids are allocated once at creation and never rewritten.
//! - Update overwrites `estado`, `ultima_actualizacion`, `avance` and
//!   `responsable` unconditionally; `observaciones` only when non-empty.
//! - Enumerated values are stored as submitted unless strict mode is on.

use crate::form::fields::PericiaForm;
use crate::model::case::{Case, Pericia, PericiaId};
use crate::model::catalog::{check_catalog, CatalogError, CatalogField};
use crate::repo::case_repo::{CaseRepository, RepoError};
use crate::service::clock::{format_edit_timestamp, Clock, SystemClock};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Title marker for "add pericia" submissions.
pub const TRIGGER_CREATE: &str = "AGREGAR";
/// Title marker for "update pericia" submissions.
pub const TRIGGER_UPDATE: &str = "ACTUALIZAR";
/// Actor recorded when the submitter identity is unavailable.
pub const UNKNOWN_ACTOR: &str = "unknown";

/// Ingestion error. Every variant aborts the invocation without writing.
#[derive(Debug)]
pub enum IngestError {
    /// No case id label, or only blank values.
    MissingCaseIdentifier,
    /// Update submission without `ID de Pericia`.
    MissingExaminationId,
    /// Update target does not exist in the case.
    ExaminationNotFound { caso: String, pericia_id: String },
    /// Title carries neither trigger marker.
    UnrecognizedIntent { title: String },
    /// Title carries both trigger markers.
    AmbiguousIntent { title: String },
    /// Strict mode rejected an enumerated value.
    InvalidCatalogValue(CatalogError),
    Repo(RepoError),
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCaseIdentifier => write!(f, "case identifier missing from issue form"),
            Self::MissingExaminationId => write!(f, "pericia id required for update"),
            Self::ExaminationNotFound { caso, pericia_id } => {
                write!(f, "pericia {pericia_id} not found in case {caso}")
            }
            Self::UnrecognizedIntent { title } => write!(
                f,
                "issue title must contain [{TRIGGER_CREATE} PERICIA] or [{TRIGGER_UPDATE} PERICIA], got `{title}`"
            ),
            Self::AmbiguousIntent { title } => write!(
                f,
                "issue title contains both {TRIGGER_CREATE} and {TRIGGER_UPDATE}: `{title}`"
            ),
            Self::InvalidCatalogValue(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for IngestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCatalogValue(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for IngestError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<CatalogError> for IngestError {
    fn from(value: CatalogError) -> Self {
        Self::InvalidCatalogValue(value)
    }
}

impl IngestError {
    /// Stable short code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCaseIdentifier => "missing_case_identifier",
            Self::MissingExaminationId => "missing_examination_id",
            Self::ExaminationNotFound { .. } => "examination_not_found",
            Self::UnrecognizedIntent { .. } => "unrecognized_intent",
            Self::AmbiguousIntent { .. } => "ambiguous_intent",
            Self::InvalidCatalogValue(_) => "invalid_catalog_value",
            Self::Repo(_) => "repo_error",
        }
    }
}

/// Mutation requested by a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Append a new pericia.
    Create,
    /// Update an existing pericia in place.
    Update,
}

impl Intent {
    /// Derives the intent from an issue title by case-insensitive substring
    /// match on the trigger markers.
    pub fn from_title(title: &str) -> Result<Self, IngestError> {
        let upper = title.to_uppercase();
        match (upper.contains(TRIGGER_CREATE), upper.contains(TRIGGER_UPDATE)) {
            (true, false) => Ok(Self::Create),
            (false, true) => Ok(Self::Update),
            (true, true) => Err(IngestError::AmbiguousIntent {
                title: title.to_string(),
            }),
            (false, false) => Err(IngestError::UnrecognizedIntent {
                title: title.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

/// One issue submission as delivered by the trigger system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    pub title: String,
    pub body: String,
    /// Submitter identity; blank means [`UNKNOWN_ACTOR`].
    pub actor: String,
}

/// Ingestion behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// Reject `estado`/`seccion` values outside the catalog.
    pub strict_catalog: bool,
}

/// Result of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub caso: String,
    pub pericia_id: PericiaId,
    pub intent: Intent,
    /// Whether the case record did not exist before this submission.
    pub case_created: bool,
}

/// Editor identity and time applied to a mutated pericia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditStamp {
    pub editor: String,
    pub timestamp: String,
}

impl EditStamp {
    fn apply(&self, pericia: &mut Pericia) {
        pericia.last_editor = self.editor.clone();
        pericia.last_edit_ts = self.timestamp.clone();
    }
}

/// Applies one mutation to an in-memory case and returns the touched id.
///
/// # Contract
/// - `Intent::Create` appends a pericia with `case.next_pericia_id()`.
/// - `Intent::Update` edits the first pericia whose id matches.
/// - On error `case` is left untouched.
/// - On success the stored `estado_general` is recomputed.
pub fn apply_mutation(
    case: &mut Case,
    intent: Intent,
    form: &PericiaForm,
    stamp: &EditStamp,
    options: IngestOptions,
) -> Result<PericiaId, IngestError> {
    if options.strict_catalog {
        check_catalog(CatalogField::Estado, &form.estado)?;
        if intent == Intent::Create {
            check_catalog(CatalogField::Seccion, &form.seccion)?;
        }
    }

    let pericia_id = match intent {
        Intent::Create => {
            let mut pericia = Pericia {
                id: case.next_pericia_id(),
                tipo_pericia: form.tipo_pericia.clone(),
                seccion: form.seccion.clone(),
                estado: form.estado.clone(),
                fecha_disposicion: form.fecha_disposicion.clone(),
                ultima_actualizacion: form.ultima_actualizacion.clone(),
                avance: form.avance.clone(),
                responsable: form.responsable.clone(),
                observaciones: form.observaciones.clone(),
                ..Pericia::default()
            };
            stamp.apply(&mut pericia);
            let id = pericia.id.clone();
            case.pericias.push(pericia);
            id
        }
        Intent::Update => {
            if form.pericia_id.is_empty() {
                return Err(IngestError::MissingExaminationId);
            }
            let caso = case.caso.clone();
            let pericia = case.find_pericia_mut(&form.pericia_id).ok_or_else(|| {
                IngestError::ExaminationNotFound {
                    caso,
                    pericia_id: form.pericia_id.clone(),
                }
            })?;

            // Blank values clear stale data here.
            pericia.estado = form.estado.clone();
            pericia.ultima_actualizacion = form.ultima_actualizacion.clone();
            pericia.avance = form.avance.clone();
            pericia.responsable = form.responsable.clone();
            if !form.observaciones.is_empty() {
                pericia.observaciones = form.observaciones.clone();
            }
            stamp.apply(pericia);
            pericia.id.clone()
        }
    };

    case.refresh_estado_general();
    Ok(pericia_id)
}

/// Ingestion service over a case repository.
pub struct IngestService<R: CaseRepository> {
    repo: R,
    clock: Box<dyn Clock>,
    options: IngestOptions,
}

impl<R: CaseRepository> IngestService<R> {
    /// Creates a service using wall-clock time and default options.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Box::new(SystemClock))
    }

    /// Creates a service with an explicit time source.
    pub fn with_clock(repo: R, clock: Box<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            options: IngestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn into_repo(self) -> R {
        self.repo
    }

    /// Parses and applies one issue submission end to end.
    ///
    /// # Side effects
    /// - Writes the full case record on success, nothing on failure.
    /// - Emits `ingest` logging events with duration and status.
    pub fn ingest(&mut self, request: &IngestRequest) -> Result<IngestOutcome, IngestError> {
        let started_at = Instant::now();
        let result = Intent::from_title(&request.title).and_then(|intent| {
            let form = PericiaForm::parse(&request.body);
            self.apply_form(intent, &form, &request.actor)
        });

        match &result {
            Ok(outcome) => info!(
                "event=ingest module=service status=ok action={} caso={} pericia_id={} case_created={} duration_ms={}",
                outcome.intent.as_str(),
                outcome.caso,
                outcome.pericia_id,
                outcome.case_created,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=ingest module=service status=error error_code={} duration_ms={} error={}",
                err.code(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Applies an already parsed form under a known intent.
    pub fn apply_form(
        &mut self,
        intent: Intent,
        form: &PericiaForm,
        actor: &str,
    ) -> Result<IngestOutcome, IngestError> {
        if form.caso.is_empty() {
            return Err(IngestError::MissingCaseIdentifier);
        }

        let case_created = !self.repo.exists(&form.caso)?;
        let mut case = self.repo.load(&form.caso)?;

        let actor = actor.trim();
        let stamp = EditStamp {
            editor: if actor.is_empty() {
                UNKNOWN_ACTOR.to_string()
            } else {
                actor.to_string()
            },
            timestamp: format_edit_timestamp(self.clock.now()),
        };
        let pericia_id = apply_mutation(&mut case, intent, form, &stamp, self.options)?;

        self.repo.save(&case)?;
        Ok(IngestOutcome {
            caso: case.caso,
            pericia_id,
            intent,
            case_created,
        })
    }
}
