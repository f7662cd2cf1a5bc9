//! In-memory ledger implementing the renumbering storage boundary.
//!
//! Useful for embedding the core without SQLite and for tests. Shifts are
//! computed on a copy and swapped in only when the result is valid, which
//! gives the same all-or-nothing behavior as the SQLite transaction.

use super::executor::RangeMutator;
use super::scope::{ScopeReader, ScopeSnapshot};
use crate::model::document::{Document, DocumentNumber};
use crate::model::period::PeriodId;
use crate::repo::{RepoError, RepoResult};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryPeriod {
    locked: bool,
    documents: BTreeMap<DocumentNumber, Document>,
}

/// Single-threaded in-memory ledger keyed by period.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    periods: RefCell<HashMap<PeriodId, MemoryPeriod>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty unlocked period and returns its id.
    pub fn add_period(&self) -> PeriodId {
        let id = Uuid::new_v4();
        self.periods
            .borrow_mut()
            .insert(id, MemoryPeriod::default());
        id
    }

    /// Adds a period holding one dated-at-zero document per number.
    pub fn add_period_with_numbers(&self, numbers: &[DocumentNumber]) -> PeriodId {
        let id = self.add_period();
        let mut periods = self.periods.borrow_mut();
        if let Some(period) = periods.get_mut(&id) {
            for number in numbers {
                period
                    .documents
                    .insert(*number, Document::new(id, *number, 0));
            }
        }
        id
    }

    /// Inserts a document, enforcing the same rules as the SQLite store.
    pub fn insert(&self, document: Document) -> RepoResult<()> {
        document.validate()?;
        let mut periods = self.periods.borrow_mut();
        let period = writable_period(&mut periods, document.period_uuid)?;
        if period.documents.contains_key(&document.number) {
            return Err(RepoError::DuplicateNumber {
                period_uuid: document.period_uuid,
                number: document.number,
            });
        }
        period.documents.insert(document.number, document);
        Ok(())
    }

    pub fn set_locked(&self, period_uuid: PeriodId, locked: bool) -> RepoResult<()> {
        let mut periods = self.periods.borrow_mut();
        let period = periods
            .get_mut(&period_uuid)
            .ok_or(RepoError::PeriodNotFound(period_uuid))?;
        period.locked = locked;
        Ok(())
    }

    /// Numbers currently used in a period, ascending.
    pub fn numbers(&self, period_uuid: PeriodId) -> RepoResult<Vec<DocumentNumber>> {
        let periods = self.periods.borrow();
        let period = periods
            .get(&period_uuid)
            .ok_or(RepoError::PeriodNotFound(period_uuid))?;
        Ok(period.documents.keys().copied().collect())
    }
}

impl ScopeReader for MemoryLedger {
    fn load_scope(&self, period_uuid: PeriodId) -> RepoResult<ScopeSnapshot> {
        let periods = self.periods.borrow();
        let period = periods
            .get(&period_uuid)
            .ok_or(RepoError::PeriodNotFound(period_uuid))?;
        Ok(ScopeSnapshot::new(
            period_uuid,
            period.documents.values().cloned().collect(),
        ))
    }
}

impl RangeMutator for MemoryLedger {
    fn apply_shift(
        &self,
        period_uuid: PeriodId,
        start: DocumentNumber,
        end: DocumentNumber,
        shift: DocumentNumber,
    ) -> RepoResult<usize> {
        let mut periods = self.periods.borrow_mut();
        let period = writable_period(&mut periods, period_uuid)?;

        let mut shifted = BTreeMap::new();
        let mut moved = 0;
        for (number, document) in &period.documents {
            let target = if (start..=end).contains(number) {
                moved += 1;
                let target = number.checked_add(shift).ok_or(RepoError::NumberOutOfRange {
                    period_uuid,
                    number: None,
                })?;
                if target < 1 {
                    return Err(RepoError::NumberOutOfRange {
                        period_uuid,
                        number: Some(target),
                    });
                }
                target
            } else {
                *number
            };

            let mut document = document.clone();
            document.number = target;
            if shifted.insert(target, document).is_some() {
                return Err(RepoError::DuplicateNumber {
                    period_uuid,
                    number: target,
                });
            }
        }

        period.documents = shifted;
        Ok(moved)
    }
}

fn writable_period(
    periods: &mut HashMap<PeriodId, MemoryPeriod>,
    period_uuid: PeriodId,
) -> RepoResult<&mut MemoryPeriod> {
    let period = periods
        .get_mut(&period_uuid)
        .ok_or(RepoError::PeriodNotFound(period_uuid))?;
    if period.locked {
        return Err(RepoError::PeriodLocked(period_uuid));
    }
    Ok(period)
}
