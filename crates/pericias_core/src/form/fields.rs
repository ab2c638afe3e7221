//! Typed view over the labels of the pericia issue forms.
//!
//! Label lookup stays here; the rest of the pipeline only sees
//! [`PericiaForm`].

use crate::form::parser::{parse_form, FormFields};

/// Case id labels, including historical spellings with `º` (U+00BA) and `°`
/// (U+00B0). Earlier entries win when several are filled.
pub const LABELS_CASO: &[&str] = &["Nº Caso", "N° Caso"];
pub const LABEL_PERICIA_ID: &str = "ID de Pericia";
pub const LABEL_TIPO_PERICIA: &str = "Tipo de Pericia";
pub const LABEL_SECCION: &str = "Sección Responsable";
pub const LABEL_ESTADO: &str = "Estado";
pub const LABEL_FECHA_DISPOSICION: &str = "Fecha de Disposición (YYYY-MM-DD)";
pub const LABEL_ULTIMA_ACTUALIZACION: &str = "Última Actualización (YYYY-MM-DD)";
pub const LABEL_AVANCE: &str = "Avance / Acción realizada";
pub const LABEL_RESPONSABLE: &str = "Responsable";
pub const LABEL_OBSERVACIONES: &str = "Observaciones";

/// Submitted pericia form with every known field resolved and trimmed.
///
/// Absent labels resolve to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PericiaForm {
    pub caso: String,
    pub pericia_id: String,
    pub tipo_pericia: String,
    pub seccion: String,
    pub estado: String,
    pub fecha_disposicion: String,
    pub ultima_actualizacion: String,
    pub avance: String,
    pub responsable: String,
    pub observaciones: String,
}

impl PericiaForm {
    /// Parses an issue body and resolves known labels.
    pub fn parse(body: &str) -> Self {
        Self::from_fields(&parse_form(body))
    }

    /// Resolves known labels from an already parsed mapping.
    pub fn from_fields(fields: &FormFields) -> Self {
        let single = |label: &str| fields.get(label).trim().to_string();
        Self {
            caso: fields.first_non_empty(LABELS_CASO).to_string(),
            pericia_id: single(LABEL_PERICIA_ID),
            tipo_pericia: single(LABEL_TIPO_PERICIA),
            seccion: single(LABEL_SECCION),
            estado: single(LABEL_ESTADO),
            fecha_disposicion: single(LABEL_FECHA_DISPOSICION),
            ultima_actualizacion: single(LABEL_ULTIMA_ACTUALIZACION),
            avance: single(LABEL_AVANCE),
            responsable: single(LABEL_RESPONSABLE),
            observaciones: single(LABEL_OBSERVACIONES),
        }
    }
}
