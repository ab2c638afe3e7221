//! Enumerated value sets shared by ingestion and export.
//!
//! # Responsibility
//! - Own the canonical status and section lists.
//! - Provide the status rollup used by stored records and the summary index.
//!
//! # Invariants
//! - `ESTADOS` order is the order shown in the spreadsheet choice list.
//! - Status rollup precedence is `No iniciada` > `En proceso` > `Realizada`.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stored status for a pericia that has not started.
pub const ESTADO_NO_INICIADA: &str = "No iniciada";
/// Stored status for a pericia in progress.
pub const ESTADO_EN_PROCESO: &str = "En proceso";
/// Stored status for a finished pericia.
pub const ESTADO_REALIZADA: &str = "Realizada";

/// Allowed pericia statuses, in display order.
pub const ESTADOS: &[&str] = &[ESTADO_NO_INICIADA, ESTADO_EN_PROCESO, ESTADO_REALIZADA];

/// Allowed responsible sections, in display order.
pub const SECCIONES: &[&str] = &[
    "AVA",
    "AVIS +F",
    "DOCUMENTOLOGIA",
    "BALISTICA",
    "PAPILOSCOPIA",
    "IDENTIDAD HUMANA",
    "REVENIDOS QUIMICOS",
    "REMARCACIONES",
    "DILIGENCIAS IOT",
    "ESCENA IOT",
    "MODELO FLAGRANCIA",
    "QUIMICA Y TOXICOLOGIA",
];

/// Default case category assigned to newly synthesized cases.
pub const DEFAULT_CASE_TYPE: &str = "Connotación";

/// Lifecycle state of one pericia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EstadoPericia {
    NoIniciada,
    EnProceso,
    Realizada,
}

impl EstadoPericia {
    /// Stable string stored in case records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoIniciada => ESTADO_NO_INICIADA,
            Self::EnProceso => ESTADO_EN_PROCESO,
            Self::Realizada => ESTADO_REALIZADA,
        }
    }

    /// Parses an exact stored status string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            ESTADO_NO_INICIADA => Some(Self::NoIniciada),
            ESTADO_EN_PROCESO => Some(Self::EnProceso),
            ESTADO_REALIZADA => Some(Self::Realizada),
            _ => None,
        }
    }
}

impl Display for EstadoPericia {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rolls pericia statuses up into one case-level status.
///
/// Any `No iniciada` wins, then any `En proceso`; otherwise `Realizada`.
/// An empty input rolls up to `No iniciada`. Values outside the catalog only
/// count towards "non-empty" and therefore end up as `Realizada`.
pub fn rollup_estado<'a, I>(estados: I) -> EstadoPericia
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen_any = false;
    let mut in_progress = false;
    for estado in estados {
        seen_any = true;
        match EstadoPericia::parse(estado) {
            Some(EstadoPericia::NoIniciada) => return EstadoPericia::NoIniciada,
            Some(EstadoPericia::EnProceso) => in_progress = true,
            _ => {}
        }
    }

    if !seen_any {
        EstadoPericia::NoIniciada
    } else if in_progress {
        EstadoPericia::EnProceso
    } else {
        EstadoPericia::Realizada
    }
}

/// Catalog field checked by strict ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogField {
    Estado,
    Seccion,
}

impl CatalogField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Estado => "estado",
            Self::Seccion => "seccion",
        }
    }

    fn allowed(self) -> &'static [&'static str] {
        match self {
            Self::Estado => ESTADOS,
            Self::Seccion => SECCIONES,
        }
    }
}

/// Value outside the enumerated set for its field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogError {
    pub field: CatalogField,
    pub value: String,
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "value `{}` is not allowed for {}; expected one of: {}",
            self.value,
            self.field.as_str(),
            self.field.allowed().join(", ")
        )
    }
}

impl Error for CatalogError {}

/// Checks a value against its catalog. Empty values are always accepted.
pub fn check_catalog(field: CatalogField, value: &str) -> Result<(), CatalogError> {
    if value.is_empty() || field.allowed().contains(&value) {
        return Ok(());
    }
    Err(CatalogError {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{check_catalog, rollup_estado, CatalogField, EstadoPericia, ESTADOS, SECCIONES};

    #[test]
    fn estado_round_trips_through_strings() {
        for value in ESTADOS {
            let parsed = EstadoPericia::parse(value).expect("catalog value should parse");
            assert_eq!(parsed.as_str(), *value);
        }
        assert_eq!(EstadoPericia::parse("en proceso"), None);
    }

    #[test]
    fn rollup_follows_precedence() {
        assert_eq!(rollup_estado(Vec::<&str>::new()), EstadoPericia::NoIniciada);
        assert_eq!(
            rollup_estado(["Realizada", "En proceso"]),
            EstadoPericia::EnProceso
        );
        assert_eq!(
            rollup_estado(["Realizada", "Realizada"]),
            EstadoPericia::Realizada
        );
        assert_eq!(
            rollup_estado(["Realizada", "En proceso", "No iniciada"]),
            EstadoPericia::NoIniciada
        );
    }

    #[test]
    fn rollup_treats_unknown_and_blank_as_done() {
        assert_eq!(rollup_estado(["", "Pendiente"]), EstadoPericia::Realizada);
    }

    #[test]
    fn catalog_check_accepts_blank_and_listed_values() {
        assert!(check_catalog(CatalogField::Estado, "").is_ok());
        assert!(check_catalog(CatalogField::Seccion, SECCIONES[3]).is_ok());

        let err = check_catalog(CatalogField::Seccion, "BALÍSTICA").unwrap_err();
        assert_eq!(err.field, CatalogField::Seccion);
        assert!(err.to_string().contains("BALÍSTICA"));
    }
}
