//! Case and pericia domain records.
//!
//! # Responsibility
//! - Define the durable shape of one case file and its pericias.
//! - Own pericia id allocation.
//!
//! # Invariants
//! - `Case::caso` never changes after the case is created.
//! - Pericia ids are `PER-<n>` with `n` zero-padded to three digits, allocated
//!   as `max(existing) + 1`. Gaps are never filled.
//! - Members not modelled here survive a load/save cycle through `extra`.

use crate::model::catalog::{rollup_estado, EstadoPericia, DEFAULT_CASE_TYPE};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static PERICIA_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^PER-(\d+)").expect("valid pericia id regex"));

/// Stable identifier of a pericia within its case, e.g. `PER-004`.
pub type PericiaId = String;

/// One forensic case record, persisted as a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// External case identifier, e.g. `123-2024`.
    pub caso: String,
    /// Case category.
    #[serde(default)]
    pub tipo: String,
    /// Free-form incident date.
    #[serde(default)]
    pub fecha_hecho: String,
    /// Stored status rollup, refreshed on each mutation.
    #[serde(default)]
    pub estado_general: String,
    /// Pericias in storage order.
    #[serde(default)]
    pub pericias: Vec<Pericia>,
    /// Members written by other tools; kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One examination ("pericia") inside a case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pericia {
    #[serde(default)]
    pub id: PericiaId,
    #[serde(default)]
    pub tipo_pericia: String,
    /// Responsible section; expected to be one of `catalog::SECCIONES`.
    #[serde(default)]
    pub seccion: String,
    /// Status; expected to be one of `catalog::ESTADOS`.
    #[serde(default)]
    pub estado: String,
    #[serde(default)]
    pub fecha_disposicion: String,
    /// ISO date (`YYYY-MM-DD`), so string order is chronological order.
    #[serde(default)]
    pub ultima_actualizacion: String,
    /// Progress note.
    #[serde(default)]
    pub avance: String,
    #[serde(default)]
    pub responsable: String,
    #[serde(default)]
    pub observaciones: String,
    /// Identity of the last submitter.
    #[serde(rename = "_last_editor", default)]
    pub last_editor: String,
    /// UTC ISO-8601 timestamp with trailing `Z`.
    #[serde(rename = "_last_edit_ts", default)]
    pub last_edit_ts: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Case {
    /// Synthesizes an empty case with default category and status.
    pub fn new(caso: impl Into<String>) -> Self {
        Self {
            caso: caso.into(),
            tipo: DEFAULT_CASE_TYPE.to_string(),
            fecha_hecho: String::new(),
            estado_general: EstadoPericia::NoIniciada.as_str().to_string(),
            pericias: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Returns the id the next created pericia receives.
    ///
    /// Ids that do not start with `PER-<digits>` are ignored.
    pub fn next_pericia_id(&self) -> PericiaId {
        let next = self
            .pericias
            .iter()
            .filter_map(|pericia| pericia_sequence(&pericia.id))
            .max()
            .map_or(1, |max| max + 1);
        format!("PER-{next:03}")
    }

    /// Finds the first pericia whose trimmed id equals `id`, in storage order.
    pub fn find_pericia_mut(&mut self, id: &str) -> Option<&mut Pericia> {
        self.pericias
            .iter_mut()
            .find(|pericia| pericia.id.trim() == id)
    }

    /// Rolled-up status over all pericias.
    pub fn rollup_estado(&self) -> EstadoPericia {
        rollup_estado(self.pericias.iter().map(|pericia| pericia.estado.as_str()))
    }

    /// Recomputes the stored `estado_general` from current pericias.
    pub fn refresh_estado_general(&mut self) {
        self.estado_general = self.rollup_estado().as_str().to_string();
    }

    /// Lexicographic maximum non-empty `ultima_actualizacion`, or `""`.
    pub fn max_ultima_actualizacion(&self) -> &str {
        self.pericias
            .iter()
            .map(|pericia| pericia.ultima_actualizacion.as_str())
            .filter(|value| !value.is_empty())
            .max()
            .unwrap_or("")
    }
}

fn pericia_sequence(id: &str) -> Option<u64> {
    PERICIA_ID_RE
        .captures(id.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::{Case, Pericia};

    fn pericia(id: &str) -> Pericia {
        Pericia {
            id: id.to_string(),
            ..Pericia::default()
        }
    }

    #[test]
    fn first_pericia_gets_per_001() {
        assert_eq!(Case::new("1-2024").next_pericia_id(), "PER-001");
    }

    #[test]
    fn next_id_is_max_plus_one_without_filling_gaps() {
        let mut case = Case::new("1-2024");
        case.pericias = vec![pericia("PER-001"), pericia("PER-003")];
        assert_eq!(case.next_pericia_id(), "PER-004");
    }

    #[test]
    fn next_id_ignores_malformed_ids_and_grows_past_three_digits() {
        let mut case = Case::new("1-2024");
        case.pericias = vec![pericia("legacy"), pericia(" PER-999 "), pericia("")];
        assert_eq!(case.next_pericia_id(), "PER-1000");
    }

    #[test]
    fn max_ultima_actualizacion_skips_blank_values() {
        let mut case = Case::new("1-2024");
        assert_eq!(case.max_ultima_actualizacion(), "");

        let mut older = pericia("PER-001");
        older.ultima_actualizacion = "2024-03-09".to_string();
        let mut newer = pericia("PER-002");
        newer.ultima_actualizacion = "2024-11-01".to_string();
        case.pericias = vec![older, pericia("PER-003"), newer];
        assert_eq!(case.max_ultima_actualizacion(), "2024-11-01");
    }

    #[test]
    fn find_pericia_mut_matches_trimmed_stored_id() {
        let mut case = Case::new("1-2024");
        case.pericias = vec![pericia("PER-001 "), pericia("PER-002")];
        assert!(case.find_pericia_mut("PER-001").is_some());
        assert!(case.find_pericia_mut("PER-009").is_none());
    }
}
