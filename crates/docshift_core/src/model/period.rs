//! Accounting period model.
//!
//! # Responsibility
//! - Describe the uniqueness scope for document numbers.
//!
//! # Invariants
//! - `end_date` is not earlier than `start_date`.
//! - A locked period accepts no new documents and no renumbering.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of an accounting period.
pub type PeriodId = Uuid;

/// One accounting period (fiscal year or similar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub uuid: PeriodId,
    /// Unix epoch milliseconds, inclusive.
    pub start_date: i64,
    /// Unix epoch milliseconds, inclusive.
    pub end_date: i64,
    pub locked: bool,
}

/// Validation failure for period or document values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// `end_date` precedes `start_date`.
    InvalidPeriodRange { start_date: i64, end_date: i64 },
    /// Document number is zero or negative.
    NonPositiveNumber(i64),
    /// Document date falls outside its period.
    DateOutsidePeriod { date: i64 },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPeriodRange {
                start_date,
                end_date,
            } => write!(
                f,
                "period end {end_date} is earlier than period start {start_date}"
            ),
            Self::NonPositiveNumber(number) => {
                write!(f, "document number must be positive, got {number}")
            }
            Self::DateOutsidePeriod { date } => {
                write!(f, "document date {date} is outside its period")
            }
        }
    }
}

impl Error for ModelValidationError {}

impl Period {
    /// Creates an unlocked period with a generated id.
    pub fn new(start_date: i64, end_date: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            start_date,
            end_date,
            locked: false,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.end_date < self.start_date {
            return Err(ModelValidationError::InvalidPeriodRange {
                start_date: self.start_date,
                end_date: self.end_date,
            });
        }
        Ok(())
    }

    /// Returns whether `date` (epoch ms) falls inside this period.
    pub fn contains(&self, date: i64) -> bool {
        (self.start_date..=self.end_date).contains(&date)
    }
}
