//! Issue-form ingestion boundary.
//!
//! # Responsibility
//! - Turn a rendered issue-form body into labeled values.
//! - Resolve known labels (and their historical spellings) into a typed form.
//!
//! # Invariants
//! - Nothing in this module fails; absent labels become empty strings.

pub mod fields;
pub mod parser;
