//! Flattened pericia report and its XLSX rendering.
//!
//! # Responsibility
//! - Denormalize cases into one row per pericia.
//! - Render the report plus a choice-list sheet that constrains the status
//!   and section columns.
//!
//! # Invariants
//! - Row order is case order, then pericia storage order.
//! - Case-level columns repeat on every row of that case.
//! - Choice lists come from `model::catalog`, the same lists strict
//!   ingestion checks against.
//! - Rendering is byte-stable for a given table: the document creation date
//!   is derived from the data, not from the wall clock.

use crate::model::case::Case;
use crate::model::catalog::{ESTADOS, SECCIONES};
use chrono::{DateTime, Datelike};
use rust_xlsxwriter::{
    ColNum, DataValidation, DocProperties, ExcelDateTime, Formula, RowNum, Workbook, Worksheet,
    XlsxError,
};

/// Main data sheet name.
pub const MATRIX_SHEET: &str = "MATRIZ_GENERAL";
/// Choice-list sheet name.
pub const VALIDATION_SHEET: &str = "VALIDACIONES";

pub const REPORT_COLUMN_COUNT: usize = 13;

pub const REPORT_HEADERS: [&str; REPORT_COLUMN_COUNT] = [
    "Nº Caso",
    "Tipo de Caso",
    "Fecha del Hecho",
    "Tipo de Pericia",
    "Sección Responsable",
    "Fecha de Disposición",
    "Estado de la Pericia",
    "Fecha Última Actualización",
    "Acción / Avance Realizado",
    "Responsable",
    "Observaciones",
    "Usuario editor",
    "Timestamp",
];

/// Zero-based column of "Sección Responsable" (E).
pub const SECCION_COLUMN: ColNum = 4;
/// Zero-based column of "Estado de la Pericia" (G).
pub const ESTADO_COLUMN: ColNum = 6;
/// Zero-based column of "Timestamp" (M).
const TIMESTAMP_COLUMN: usize = 12;
/// Creation date stamped on reports whose rows carry no edit timestamp.
const FALLBACK_CREATED: (u16, u8, u8) = (2000, 1, 1);
/// Last zero-based row covered by the choice-list validation (Excel row 5000).
pub const VALIDATION_LAST_ROW: RowNum = 4999;

/// One report row, in `REPORT_HEADERS` order.
pub type ReportRow = [String; REPORT_COLUMN_COUNT];

/// Denormalized report body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportTable {
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    /// Flattens cases into one row per pericia.
    pub fn from_cases(cases: &[Case]) -> Self {
        let rows = cases
            .iter()
            .flat_map(|case| {
                case.pericias.iter().map(move |p| {
                    [
                        case.caso.clone(),
                        case.tipo.clone(),
                        case.fecha_hecho.clone(),
                        p.tipo_pericia.clone(),
                        p.seccion.clone(),
                        p.fecha_disposicion.clone(),
                        p.estado.clone(),
                        p.ultima_actualizacion.clone(),
                        p.avance.clone(),
                        p.responsable.clone(),
                        p.observaciones.clone(),
                        p.last_editor.clone(),
                        p.last_edit_ts.clone(),
                    ]
                })
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Absolute reference to a one-column choice list starting at row 2.
fn choice_list_range(column: char, len: usize) -> String {
    format!("{VALIDATION_SHEET}!${column}$2:${column}${}", 1 + len)
}

fn choice_list_rule(column: char, len: usize) -> DataValidation {
    DataValidation::new().allow_list_formula(Formula::new(format!(
        "={}",
        choice_list_range(column, len)
    )))
}

fn row_num(index: usize) -> Result<RowNum, XlsxError> {
    RowNum::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

fn build_matrix_sheet(table: &ReportTable) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(MATRIX_SHEET)?;

    for (col, header) in (0..).zip(REPORT_HEADERS.iter()) {
        sheet.write_string(0, col, *header)?;
    }
    for (index, row) in table.rows.iter().enumerate() {
        let row_index = row_num(index + 1)?;
        for (col, value) in (0..).zip(row.iter()) {
            sheet.write_string(row_index, col, value.as_str())?;
        }
    }

    let estado_rule = choice_list_rule('A', ESTADOS.len());
    let seccion_rule = choice_list_rule('B', SECCIONES.len());
    sheet.add_data_validation(
        1,
        ESTADO_COLUMN,
        VALIDATION_LAST_ROW,
        ESTADO_COLUMN,
        &estado_rule,
    )?;
    sheet.add_data_validation(
        1,
        SECCION_COLUMN,
        VALIDATION_LAST_ROW,
        SECCION_COLUMN,
        &seccion_rule,
    )?;

    Ok(sheet)
}

fn build_validation_sheet() -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(VALIDATION_SHEET)?;

    sheet.write_string(0, 0, "Estados")?;
    for (index, estado) in ESTADOS.iter().enumerate() {
        sheet.write_string(row_num(index + 1)?, 0, *estado)?;
    }
    sheet.write_string(0, 1, "Secciones")?;
    for (index, seccion) in SECCIONES.iter().enumerate() {
        sheet.write_string(row_num(index + 1)?, 1, *seccion)?;
    }

    Ok(sheet)
}

/// `(year, month, day)` of the latest parseable edit timestamp in the table.
/// Years outside the 1900..=9999 spreadsheet range are ignored.
fn creation_ymd(table: &ReportTable) -> (u16, u8, u8) {
    table
        .rows
        .iter()
        .filter_map(|row| DateTime::parse_from_rfc3339(&row[TIMESTAMP_COLUMN]).ok())
        .filter(|stamp| (1900..=9999).contains(&stamp.naive_utc().year()))
        .max()
        .map(|stamp| {
            let date = stamp.naive_utc().date();
            (date.year() as u16, date.month() as u8, date.day() as u8)
        })
        .unwrap_or(FALLBACK_CREATED)
}

/// Renders the two-sheet workbook into an in-memory XLSX file.
pub fn render_workbook(table: &ReportTable) -> Result<Vec<u8>, XlsxError> {
    let (year, month, day) = creation_ymd(table);
    let created = ExcelDateTime::from_ymd(year, month, day)?;
    let properties = DocProperties::new().set_creation_datetime(&created);
    let mut workbook = Workbook::new();
    workbook.set_properties(&properties);
    workbook.push_worksheet(build_matrix_sheet(table)?);
    workbook.push_worksheet(build_validation_sheet()?);
    workbook.save_to_buffer()
}
