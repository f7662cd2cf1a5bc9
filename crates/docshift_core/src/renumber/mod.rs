//! Uniqueness-preserving bulk renumbering of document numbers.
//!
//! # Responsibility
//! - Preview a contiguous range shift within one period, flagging every
//!   document that would collide with a number left in place.
//! - Apply an approved shift as one all-or-nothing mutation.
//!
//! # Invariants
//! - Within a period no two documents share a number, before and after any
//!   operation.
//! - Previewing never mutates storage.
//! - A zero shift is rejected before any storage access.
//!
//! Storage is reached only through [`scope::ScopeReader`] and
//! [`executor::RangeMutator`], so callers inject the boundary explicitly.

use crate::model::document::DocumentNumber;
use crate::model::period::PeriodId;
use crate::repo::RepoError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod conflict;
pub mod executor;
pub mod memory;
pub mod planner;
pub mod scope;

/// Caller input for one shift: move every number in `[start, end]` by `shift`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftRequest {
    pub start: DocumentNumber,
    pub end: DocumentNumber,
    pub shift: DocumentNumber,
}

impl ShiftRequest {
    pub fn new(start: DocumentNumber, end: DocumentNumber, shift: DocumentNumber) -> Self {
        Self { start, end, shift }
    }

    /// Structural checks that need no storage access.
    ///
    /// # Errors
    /// - `NoOpShift` when `shift == 0` (checked first).
    /// - `InvalidRange` when `start > end`, `start < 1`, or the shifted
    ///   bounds overflow.
    pub fn validate(&self) -> Result<(), RenumberError> {
        if self.shift == 0 {
            return Err(RenumberError::NoOpShift);
        }
        let shifted_bounds = self
            .start
            .checked_add(self.shift)
            .zip(self.end.checked_add(self.shift));
        if self.start > self.end || self.start < 1 || shifted_bounds.is_none() {
            return Err(RenumberError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// The request that undoes this one once it has been committed.
    ///
    /// `None` when the shifted bounds or the negated shift overflow `i64`.
    pub fn inverse(&self) -> Option<Self> {
        Some(Self {
            start: self.start.checked_add(self.shift)?,
            end: self.end.checked_add(self.shift)?,
            shift: self.shift.checked_neg()?,
        })
    }

    pub fn contains(&self, number: DocumentNumber) -> bool {
        (self.start..=self.end).contains(&number)
    }
}

impl Display for ShiftRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}] by {:+}", self.start, self.end, self.shift)
    }
}

pub type RenumberResult<T> = Result<T, RenumberError>;

/// Errors surfaced by planning, committing and session handling.
#[derive(Debug)]
pub enum RenumberError {
    /// Shift is zero; nothing would move.
    NoOpShift,
    /// Source range is reversed, starts below 1, or overflows when shifted.
    InvalidRange {
        start: DocumentNumber,
        end: DocumentNumber,
    },
    /// No document number lies in the source range.
    EmptyRange {
        start: DocumentNumber,
        end: DocumentNumber,
    },
    /// Shifted numbers would collide; lists the offending old numbers.
    IdentifierConflict { numbers: Vec<DocumentNumber> },
    /// Period does not exist.
    ScopeNotFound(PeriodId),
    /// Storage boundary failed; nothing was applied.
    Persistence(RepoError),
    /// Commit requested without a current preview.
    NotPreviewed,
    /// Session already committed.
    SessionFinished,
}

impl RenumberError {
    /// Returns whether retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Stable machine-readable code, used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoOpShift => "noop_shift",
            Self::InvalidRange { .. } => "invalid_range",
            Self::EmptyRange { .. } => "empty_range",
            Self::IdentifierConflict { .. } => "identifier_conflict",
            Self::ScopeNotFound(_) => "scope_not_found",
            Self::Persistence(_) => "persistence_error",
            Self::NotPreviewed => "not_previewed",
            Self::SessionFinished => "session_finished",
        }
    }
}

impl Display for RenumberError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoOpShift => write!(f, "shift must not be zero"),
            Self::InvalidRange { start, end } => {
                write!(f, "invalid document number range [{start}, {end}]")
            }
            Self::EmptyRange { start, end } => {
                write!(f, "no documents numbered within [{start}, {end}]")
            }
            Self::IdentifierConflict { numbers } => {
                write!(f, "shift would duplicate document numbers for {numbers:?}")
            }
            Self::ScopeNotFound(id) => write!(f, "period not found: {id}"),
            Self::Persistence(err) => write!(f, "renumbering was not applied: {err}"),
            Self::NotPreviewed => write!(f, "no committable preview"),
            Self::SessionFinished => write!(f, "renumbering session already committed"),
        }
    }
}

impl Error for RenumberError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RenumberError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::PeriodNotFound(id) => Self::ScopeNotFound(id),
            other => Self::Persistence(other),
        }
    }
}
