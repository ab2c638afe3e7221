//! Summary index projection.
//!
//! # Invariants
//! - One entry per case, in the order cases are given.
//! - Entries are derived only; nothing here is written back to case records.

use crate::model::case::Case;
use serde::{Deserialize, Serialize};

/// One line of the summary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub caso: String,
    pub tipo: String,
    pub fecha_hecho: String,
    /// Status rollup over the case's pericias.
    pub estado_general: String,
    pub total_pericias: usize,
    /// Latest non-empty `ultima_actualizacion`, or `""`.
    pub ultima_actualizacion: String,
}

impl CaseSummary {
    pub fn from_case(case: &Case) -> Self {
        Self {
            caso: case.caso.clone(),
            tipo: case.tipo.clone(),
            fecha_hecho: case.fecha_hecho.clone(),
            estado_general: case.rollup_estado().as_str().to_string(),
            total_pericias: case.pericias.len(),
            ultima_actualizacion: case.max_ultima_actualizacion().to_string(),
        }
    }
}

/// Builds the full summary index.
pub fn build_summary_index(cases: &[Case]) -> Vec<CaseSummary> {
    cases.iter().map(CaseSummary::from_case).collect()
}
