//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate parsing, mutation and persistence for issue ingestion.
//! - Orchestrate full-store export into the index and spreadsheet artifacts.
//!
//! # Invariants
//! - Services stay storage-agnostic; they only see `CaseRepository`.

pub mod clock;
pub mod export_service;
pub mod ingest_service;
