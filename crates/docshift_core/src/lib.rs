//! Core of the ledger document renumbering tool.
//!
//! Previews and applies uniqueness-preserving shifts of document numbers
//! within one accounting period. Storage is injected through the
//! [`ScopeReader`] and [`RangeMutator`] traits; SQLite and in-memory
//! implementations are provided.

pub mod db;
pub mod logging;
pub mod model;
pub mod renumber;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::document::{Document, DocumentId, DocumentNumber};
pub use model::period::{ModelValidationError, Period, PeriodId};
pub use renumber::conflict::{analyze, LandingZone, ShiftAnalysis, ShiftEntry};
pub use renumber::executor::{RangeMutator, RenumberExecutor, ShiftOutcome};
pub use renumber::memory::MemoryLedger;
pub use renumber::planner::{PreviewStatus, ShiftPlanner, ShiftPreview};
pub use renumber::scope::{ScopeReader, ScopeSnapshot};
pub use renumber::{RenumberError, RenumberResult, ShiftRequest};
pub use repo::document_repo::{DocumentRepository, SqliteDocumentRepository};
pub use repo::period_repo::{PeriodRepository, SqlitePeriodRepository};
pub use repo::{RepoError, RepoResult};
pub use service::document_service::DocumentService;
pub use service::renumber_service::{RenumberSession, SessionPhase};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
