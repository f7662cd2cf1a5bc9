//! Period and document use-case service.
//!
//! # Responsibility
//! - Create periods and sequentially numbered documents.
//! - Keep numbering rules (date inside period, next free number) above the
//!   repository layer.

use crate::model::document::{Document, DocumentId};
use crate::model::period::{ModelValidationError, Period, PeriodId};
use crate::repo::document_repo::DocumentRepository;
use crate::repo::period_repo::PeriodRepository;
use crate::repo::{RepoError, RepoResult};

/// Use-case facade over period and document repositories.
pub struct DocumentService<P: PeriodRepository, D: DocumentRepository> {
    periods: P,
    documents: D,
}

impl<P: PeriodRepository, D: DocumentRepository> DocumentService<P, D> {
    pub fn new(periods: P, documents: D) -> Self {
        Self { periods, documents }
    }

    /// Creates an unlocked period spanning `[start_date, end_date]`.
    pub fn create_period(&self, start_date: i64, end_date: i64) -> RepoResult<Period> {
        let period = Period::new(start_date, end_date);
        self.periods.create_period(&period)?;
        Ok(period)
    }

    /// Creates a document dated `date` with the next free number.
    ///
    /// # Errors
    /// - `PeriodNotFound`, `PeriodLocked`.
    /// - `Validation(DateOutsidePeriod)` when `date` is outside the period.
    pub fn create_document(&self, period_uuid: PeriodId, date: i64) -> RepoResult<Document> {
        let period = self
            .periods
            .get_period(period_uuid)?
            .ok_or(RepoError::PeriodNotFound(period_uuid))?;
        if period.locked {
            return Err(RepoError::PeriodLocked(period_uuid));
        }
        if !period.contains(date) {
            return Err(ModelValidationError::DateOutsidePeriod { date }.into());
        }
        self.documents.create_next_document(period_uuid, date)
    }

    pub fn list_documents(&self, period_uuid: PeriodId) -> RepoResult<Vec<Document>> {
        self.documents.list_documents(period_uuid)
    }

    pub fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>> {
        self.documents.get_document(id)
    }

    pub fn delete_document(&self, id: DocumentId) -> RepoResult<()> {
        self.documents.delete_document(id)
    }

    pub fn set_period_locked(&self, period_uuid: PeriodId, locked: bool) -> RepoResult<()> {
        self.periods.set_locked(period_uuid, locked)
    }
}
