//! Committing an approved shift through the storage boundary.
//!
//! # Invariants
//! - The executor calls the boundary at most once per commit.
//! - A zero shift never reaches the boundary.
//! - On failure nothing has moved; the error is surfaced unchanged.

use super::{RenumberError, RenumberResult, ShiftRequest};
use crate::model::document::DocumentNumber;
use crate::model::period::PeriodId;
use crate::repo::RepoResult;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Storage operation that moves a number range as one transaction.
///
/// Implementations must move every document numbered in `[start, end]` by
/// `shift`, or none of them, and must reject any result that duplicates a
/// number within the period or drops below 1.
pub trait RangeMutator {
    /// Returns how many documents moved.
    fn apply_shift(
        &self,
        period_uuid: PeriodId,
        start: DocumentNumber,
        end: DocumentNumber,
        shift: DocumentNumber,
    ) -> RepoResult<usize>;
}

impl<T: RangeMutator + ?Sized> RangeMutator for &T {
    fn apply_shift(
        &self,
        period_uuid: PeriodId,
        start: DocumentNumber,
        end: DocumentNumber,
        shift: DocumentNumber,
    ) -> RepoResult<usize> {
        (**self).apply_shift(period_uuid, start, end, shift)
    }
}

/// Result of a committed shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftOutcome {
    pub period_uuid: PeriodId,
    pub request: ShiftRequest,
    pub moved: usize,
}

/// Applies shifts through a [`RangeMutator`].
pub struct RenumberExecutor<M: RangeMutator> {
    mutator: M,
}

impl<M: RangeMutator> RenumberExecutor<M> {
    pub fn new(mutator: M) -> Self {
        Self { mutator }
    }

    /// Commits `request` within `period_uuid`.
    ///
    /// Callers are expected to hold a committable preview for the same
    /// request; only the storage boundary re-checks uniqueness.
    ///
    /// # Errors
    /// - `NoOpShift` when `shift == 0`, without touching storage.
    /// - `ScopeNotFound` when the period vanished.
    /// - `Persistence` for any storage rejection; nothing was applied.
    pub fn commit(
        &self,
        period_uuid: PeriodId,
        request: ShiftRequest,
    ) -> RenumberResult<ShiftOutcome> {
        if request.shift == 0 {
            return Err(RenumberError::NoOpShift);
        }

        let started_at = Instant::now();
        match self
            .mutator
            .apply_shift(period_uuid, request.start, request.end, request.shift)
        {
            Ok(moved) => {
                info!(
                    "event=renumber_commit module=renumber status=ok period={period_uuid} start={} end={} shift={} moved={moved} duration_ms={}",
                    request.start,
                    request.end,
                    request.shift,
                    started_at.elapsed().as_millis()
                );
                Ok(ShiftOutcome {
                    period_uuid,
                    request,
                    moved,
                })
            }
            Err(err) => {
                let err = RenumberError::from(err);
                error!(
                    "event=renumber_commit module=renumber status=error period={period_uuid} start={} end={} shift={} duration_ms={} error_code={} error={err}",
                    request.start,
                    request.end,
                    request.shift,
                    started_at.elapsed().as_millis(),
                    err.code()
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RangeMutator, RenumberExecutor};
    use crate::model::period::PeriodId;
    use crate::renumber::memory::MemoryLedger;
    use crate::renumber::{RenumberError, ShiftRequest};
    use crate::repo::{RepoError, RepoResult};
    use std::cell::Cell;

    struct CountingMutator<'a> {
        inner: &'a MemoryLedger,
        calls: Cell<usize>,
    }

    impl RangeMutator for CountingMutator<'_> {
        fn apply_shift(
            &self,
            period_uuid: PeriodId,
            start: i64,
            end: i64,
            shift: i64,
        ) -> RepoResult<usize> {
            self.calls.set(self.calls.get() + 1);
            self.inner.apply_shift(period_uuid, start, end, shift)
        }
    }

    #[test]
    fn zero_shift_never_reaches_storage() {
        let ledger = MemoryLedger::new();
        let period = ledger.add_period_with_numbers(&[1, 2]);
        let mutator = CountingMutator {
            inner: &ledger,
            calls: Cell::new(0),
        };
        let executor = RenumberExecutor::new(&mutator);

        let err = executor.commit(period, ShiftRequest::new(1, 2, 0)).unwrap_err();
        assert!(matches!(err, RenumberError::NoOpShift));
        assert_eq!(mutator.calls.get(), 0);
    }

    #[test]
    fn commit_moves_range_and_reports_count() {
        let ledger = MemoryLedger::new();
        let period = ledger.add_period_with_numbers(&[1, 2, 3, 5]);
        let executor = RenumberExecutor::new(&ledger);

        let outcome = executor.commit(period, ShiftRequest::new(1, 3, 10)).unwrap();
        assert_eq!(outcome.moved, 3);
        assert_eq!(ledger.numbers(period).unwrap(), vec![5, 11, 12, 13]);
    }

    #[test]
    fn storage_rejection_surfaces_as_persistence_error() {
        let ledger = MemoryLedger::new();
        let period = ledger.add_period_with_numbers(&[1, 2, 3, 4]);
        let executor = RenumberExecutor::new(&ledger);

        let err = executor.commit(period, ShiftRequest::new(1, 2, 2)).unwrap_err();
        assert!(matches!(
            err,
            RenumberError::Persistence(RepoError::DuplicateNumber { number: 3, .. })
        ));
        assert!(err.is_retryable());
        assert_eq!(ledger.numbers(period).unwrap(), vec![1, 2, 3, 4]);
    }
}
