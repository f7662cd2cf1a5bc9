//! Ledger document model.
//!
//! Only the identity, owning period, number and date of a document are
//! modelled here. Entries and descriptions belong to other collaborators.

use super::period::{ModelValidationError, PeriodId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a ledger document.
pub type DocumentId = Uuid;

/// User-visible document number, unique within one period.
pub type DocumentNumber = i64;

/// A numbered ledger document (voucher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub uuid: DocumentId,
    pub period_uuid: PeriodId,
    pub number: DocumentNumber,
    /// Unix epoch milliseconds.
    pub date: i64,
}

impl Document {
    /// Creates a document with a generated id.
    pub fn new(period_uuid: PeriodId, number: DocumentNumber, date: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            period_uuid,
            number,
            date,
        }
    }

    /// Checks value-level invariants before persistence.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.number < 1 {
            return Err(ModelValidationError::NonPositiveNumber(self.number));
        }
        Ok(())
    }
}
