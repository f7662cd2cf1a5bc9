//! Repository layer abstractions and SQLite persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for periods and documents.
//! - Isolate SQLite query details from renumbering and service logic.
//!
//! # Invariants
//! - Write paths validate model values before SQL mutations.
//! - Repository APIs return semantic errors (`PeriodNotFound`,
//!   `PeriodLocked`) in addition to DB transport errors.

use crate::db::DbError;
use crate::model::document::{DocumentId, DocumentNumber};
use crate::model::period::{ModelValidationError, PeriodId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod document_repo;
pub mod period_repo;
mod schema;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by period and document persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Value rejected before reaching storage.
    Validation(ModelValidationError),
    /// Period does not exist.
    PeriodNotFound(PeriodId),
    /// Document does not exist.
    DocumentNotFound(DocumentId),
    /// Period is locked against document changes.
    PeriodLocked(PeriodId),
    /// A write would leave a document number below 1 or outside `i64`.
    NumberOutOfRange {
        period_uuid: PeriodId,
        number: Option<DocumentNumber>,
    },
    /// A write would give two documents of one period the same number.
    DuplicateNumber {
        period_uuid: PeriodId,
        number: DocumentNumber,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::PeriodNotFound(id) => write!(f, "period not found: {id}"),
            Self::DocumentNotFound(id) => write!(f, "document not found: {id}"),
            Self::PeriodLocked(id) => write!(f, "period is locked: {id}"),
            Self::NumberOutOfRange {
                period_uuid,
                number: Some(number),
            } => write!(
                f,
                "document number {number} is out of range in period {period_uuid}"
            ),
            Self::NumberOutOfRange {
                period_uuid,
                number: None,
            } => write!(f, "document number overflow in period {period_uuid}"),
            Self::DuplicateNumber {
                period_uuid,
                number,
            } => write!(
                f,
                "document number {number} is already used in period {period_uuid}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "ledger repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "ledger repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted ledger data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}
