//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the case record store contract.
//! - Isolate file layout and JSON encoding from ingestion/export orchestration.
//!
//! # Invariants
//! - Exactly one durable record per case identifier.
//! - Repository APIs distinguish invalid identifiers from I/O and decode
//!   failures.

pub mod case_repo;
