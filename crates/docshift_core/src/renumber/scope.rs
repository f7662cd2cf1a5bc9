//! Scope loading: the documents and numbers of one period.

use crate::model::document::{Document, DocumentNumber};
use crate::model::period::PeriodId;
use crate::repo::RepoResult;
use std::collections::BTreeSet;

/// Documents of one period, ordered by number, with the derived number set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSnapshot {
    period_uuid: PeriodId,
    documents: Vec<Document>,
    numbers: BTreeSet<DocumentNumber>,
}

impl ScopeSnapshot {
    /// Builds a snapshot, sorting documents by number.
    pub fn new(period_uuid: PeriodId, mut documents: Vec<Document>) -> Self {
        documents.sort_by_key(|document| document.number);
        let numbers = documents.iter().map(|document| document.number).collect();
        Self {
            period_uuid,
            documents,
            numbers,
        }
    }

    pub fn period_uuid(&self) -> PeriodId {
        self.period_uuid
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn numbers(&self) -> &BTreeSet<DocumentNumber> {
        &self.numbers
    }

    /// Documents whose number lies in `[start, end]`, in number order.
    pub fn documents_in(
        &self,
        start: DocumentNumber,
        end: DocumentNumber,
    ) -> impl Iterator<Item = &Document> + '_ {
        self.documents
            .iter()
            .skip_while(move |document| document.number < start)
            .take_while(move |document| document.number <= end)
    }
}

/// Loads the scope a shift is planned against.
///
/// # Errors
/// - `RepoError::PeriodNotFound` when the period does not exist.
/// - Any other `RepoError` for storage failures; callers do not retry.
pub trait ScopeReader {
    fn load_scope(&self, period_uuid: PeriodId) -> RepoResult<ScopeSnapshot>;
}

impl<T: ScopeReader + ?Sized> ScopeReader for &T {
    fn load_scope(&self, period_uuid: PeriodId) -> RepoResult<ScopeSnapshot> {
        (**self).load_scope(period_uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::ScopeSnapshot;
    use crate::model::document::Document;
    use uuid::Uuid;

    #[test]
    fn snapshot_orders_documents_and_selects_range() {
        let period = Uuid::new_v4();
        let documents = [7, 2, 5, 3]
            .into_iter()
            .map(|number| Document::new(period, number, 0))
            .collect();
        let snapshot = ScopeSnapshot::new(period, documents);
        assert_eq!(snapshot.period_uuid(), period);

        let ordered: Vec<_> = snapshot.documents().iter().map(|d| d.number).collect();
        assert_eq!(ordered, vec![2, 3, 5, 7]);

        let selected: Vec<_> = snapshot.documents_in(3, 6).map(|d| d.number).collect();
        assert_eq!(selected, vec![3, 5]);
        assert!(snapshot.numbers().contains(&7));
        assert_eq!(snapshot.documents_in(8, 10).count(), 0);
    }
}
