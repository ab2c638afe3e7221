//! Domain model for forensic cases and their pericias.
//!
//! # Responsibility
//! - Define the durable case/pericia shapes.
//! - Hold the enumerated status and section catalogs.
//!
//! # Invariants
//! - Every case is identified by its external `caso` string.
//! - Pericias are appended or updated in place, never removed.

pub mod case;
pub mod catalog;
