//! Read-only projections of the case store.
//!
//! # Responsibility
//! - Compute the summary index.
//! - Flatten cases into the pericia report and render it as XLSX.
//!
//! # Invariants
//! - Projections never mutate case records.
//! - Same input cases produce identical projections.

pub mod report;
pub mod summary;
