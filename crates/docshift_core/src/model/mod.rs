//! Ledger domain model for periods and their numbered documents.
//!
//! # Responsibility
//! - Define canonical data structures used by the renumbering core.
//!
//! # Invariants
//! - Every period and document is identified by a stable UUID.
//! - A document number is a positive integer, unique within its period.

pub mod document;
pub mod period;
