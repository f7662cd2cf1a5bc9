use docshift_core::db::open_db_in_memory;
use docshift_core::{
    Document, DocumentNumber, DocumentRepository, DocumentService, PeriodId, PeriodRepository,
    PreviewStatus, RangeMutator, RenumberError, RenumberExecutor, RenumberSession, RepoError,
    SessionPhase, ShiftPlanner, ShiftRequest, SqliteDocumentRepository, SqlitePeriodRepository,
};
use rusqlite::Connection;
use std::collections::BTreeSet;
use uuid::Uuid;

const PERIOD_START: i64 = 1_704_067_200_000;
const PERIOD_END: i64 = 1_735_689_599_999;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn seed_period(conn: &Connection, numbers: &[DocumentNumber]) -> PeriodId {
    let service = DocumentService::new(
        SqlitePeriodRepository::try_new(conn).unwrap(),
        SqliteDocumentRepository::try_new(conn).unwrap(),
    );
    let period = service.create_period(PERIOD_START, PERIOD_END).unwrap();

    let repo = SqliteDocumentRepository::try_new(conn).unwrap();
    for number in numbers {
        repo.create_document(&Document::new(period.uuid, *number, PERIOD_START))
            .unwrap();
    }
    period.uuid
}

fn numbers(conn: &Connection, period: PeriodId) -> Vec<DocumentNumber> {
    SqliteDocumentRepository::try_new(conn)
        .unwrap()
        .list_documents(period)
        .unwrap()
        .iter()
        .map(|document| document.number)
        .collect()
}

fn triples(conn: &Connection, period: PeriodId, request: ShiftRequest) -> Vec<(i64, i64, bool)> {
    let planner = ShiftPlanner::new(SqliteDocumentRepository::try_new(conn).unwrap());
    planner
        .plan(period, request)
        .unwrap()
        .entries
        .iter()
        .map(|entry| (entry.old_number, entry.new_number, entry.conflict))
        .collect()
}

#[test]
fn forward_shift_past_gap_previews_and_commits() {
    let conn = setup();
    let period = seed_period(&conn, &[1, 2, 3, 5]);
    let request = ShiftRequest::new(1, 3, 10);

    assert_eq!(
        triples(&conn, period, request),
        vec![(1, 11, false), (2, 12, false), (3, 13, false)]
    );

    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    let mut session = RenumberSession::new(repo, period);
    session.update(request).unwrap();
    let outcome = session.commit().unwrap();

    assert_eq!(outcome.moved, 3);
    assert_eq!(numbers(&conn, period), vec![5, 11, 12, 13]);
}

#[test]
fn forward_shift_into_occupied_numbers_is_blocked() {
    let conn = setup();
    let period = seed_period(&conn, &[1, 2, 3, 4]);
    let request = ShiftRequest::new(1, 2, 2);

    let planner = ShiftPlanner::new(SqliteDocumentRepository::try_new(&conn).unwrap());
    let preview = planner.plan(period, request).unwrap();
    assert_eq!(preview.status, PreviewStatus::Conflicted);
    assert!(!preview.can_commit());
    let last = preview.entries.last().unwrap();
    assert_eq!((last.old_number, last.new_number, last.conflict), (2, 4, true));

    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    let mut session = RenumberSession::new(repo, period);
    session.update(request).unwrap();
    assert!(matches!(
        session.commit(),
        Err(RenumberError::IdentifierConflict { .. })
    ));
    assert_eq!(numbers(&conn, period), vec![1, 2, 3, 4]);
}

#[test]
fn backward_shift_onto_stable_document_conflicts() {
    let conn = setup();
    let period = seed_period(&conn, &[1, 2, 3]);

    assert_eq!(
        triples(&conn, period, ShiftRequest::new(2, 3, -1)),
        vec![(2, 1, true), (3, 2, false)]
    );
}

#[test]
fn forced_conflicting_commit_is_rejected_and_rolled_back() {
    let conn = setup();
    let period = seed_period(&conn, &[1, 2, 3, 4, 8]);
    let executor = RenumberExecutor::new(SqliteDocumentRepository::try_new(&conn).unwrap());

    // 1..=3 by +5 lands 3 on the stable document 8.
    let err = executor
        .commit(period, ShiftRequest::new(1, 3, 5))
        .unwrap_err();
    assert!(matches!(
        err,
        RenumberError::Persistence(RepoError::DuplicateNumber { number: 8, .. })
    ));
    assert!(err.is_retryable());
    assert_eq!(numbers(&conn, period), vec![1, 2, 3, 4, 8]);
}

#[test]
fn shift_below_one_is_rejected_by_storage() {
    let conn = setup();
    let period = seed_period(&conn, &[2, 3, 7]);
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();

    let err = repo.apply_shift(period, 2, 3, -2).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NumberOutOfRange {
            number: Some(0),
            ..
        }
    ));
    assert_eq!(numbers(&conn, period), vec![2, 3, 7]);
}

#[test]
fn overlapping_shift_moves_whole_block() {
    let conn = setup();
    let period = seed_period(&conn, &[1, 2, 3, 4, 10]);
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();

    assert_eq!(repo.apply_shift(period, 2, 4, 1).unwrap(), 3);
    assert_eq!(numbers(&conn, period), vec![1, 3, 4, 5, 10]);

    assert_eq!(repo.apply_shift(period, 3, 5, -1).unwrap(), 3);
    assert_eq!(numbers(&conn, period), vec![1, 2, 3, 4, 10]);
}

#[test]
fn commit_then_inverse_restores_numbers_and_document_ids() {
    let conn = setup();
    let period = seed_period(&conn, &[1, 2, 4, 5, 6, 9]);
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    let before = repo.list_documents(period).unwrap();

    let executor = RenumberExecutor::new(&repo);
    let request = ShiftRequest::new(4, 6, -1);
    executor.commit(period, request).unwrap();
    assert_eq!(numbers(&conn, period), vec![1, 2, 3, 4, 5, 9]);

    executor.commit(period, request.inverse().unwrap()).unwrap();
    assert_eq!(repo.list_documents(period).unwrap(), before);
}

#[test]
fn shift_only_touches_requested_period() {
    let conn = setup();
    let first = seed_period(&conn, &[1, 2, 3]);
    let second = seed_period(&conn, &[1, 2, 3]);
    let executor = RenumberExecutor::new(SqliteDocumentRepository::try_new(&conn).unwrap());

    executor
        .commit(first, ShiftRequest::new(1, 3, 100))
        .unwrap();

    assert_eq!(numbers(&conn, first), vec![101, 102, 103]);
    assert_eq!(numbers(&conn, second), vec![1, 2, 3]);
}

#[test]
fn unknown_period_is_scope_not_found() {
    let conn = setup();
    let missing = Uuid::new_v4();
    let planner = ShiftPlanner::new(SqliteDocumentRepository::try_new(&conn).unwrap());

    let err = planner
        .plan(missing, ShiftRequest::new(1, 2, 1))
        .unwrap_err();
    assert!(matches!(err, RenumberError::ScopeNotFound(id) if id == missing));

    let executor = RenumberExecutor::new(SqliteDocumentRepository::try_new(&conn).unwrap());
    let err = executor
        .commit(missing, ShiftRequest::new(1, 2, 1))
        .unwrap_err();
    assert!(matches!(err, RenumberError::ScopeNotFound(_)));
}

#[test]
fn locked_period_fails_commit_and_session_can_retry() {
    let conn = setup();
    let period = seed_period(&conn, &[1, 2]);
    let periods = SqlitePeriodRepository::try_new(&conn).unwrap();
    let service = DocumentService::new(
        SqlitePeriodRepository::try_new(&conn).unwrap(),
        SqliteDocumentRepository::try_new(&conn).unwrap(),
    );

    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    let mut session = RenumberSession::new(repo, period);
    session.update(ShiftRequest::new(1, 2, 1)).unwrap();
    service.set_period_locked(period, true).unwrap();

    let err = session.commit().unwrap_err();
    assert!(matches!(
        err,
        RenumberError::Persistence(RepoError::PeriodLocked(_))
    ));
    assert_eq!(session.phase(), SessionPhase::Failed);

    service.set_period_locked(period, false).unwrap();
    session.update(ShiftRequest::new(1, 2, 1)).unwrap();
    session.commit().unwrap();
    assert_eq!(numbers(&conn, period), vec![2, 3]);
    assert!(!periods.get_period(period).unwrap().unwrap().locked);
}

/// Conflict-free previews commit to `(old \ source) ∪ shifted`; conflicted
/// previews are rejected by storage without any change.
#[test]
fn storage_agrees_with_preview_on_small_ledgers() {
    let conn = setup();

    for mask in 1u32..(1 << 5) {
        let seed: Vec<DocumentNumber> = (1..=5).filter(|n| mask & (1 << (n - 1)) != 0).collect();
        for start in 1..=5 {
            for end in start..=5 {
                for shift in [-3, -1, 1, 2] {
                    let period = seed_period(&conn, &seed);
                    let request = ShiftRequest::new(start, end, shift);
                    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
                    let preview = ShiftPlanner::new(&repo).plan(period, request).unwrap();
                    let result = repo.apply_shift(period, start, end, shift);

                    match preview.status {
                        PreviewStatus::Conflicted => {
                            assert!(result.is_err(), "{seed:?} {request}");
                            assert_eq!(numbers(&conn, period), seed);
                        }
                        PreviewStatus::EmptyRange => {
                            assert_eq!(result.unwrap(), 0);
                            assert_eq!(numbers(&conn, period), seed);
                        }
                        PreviewStatus::Valid => {
                            assert_eq!(result.unwrap(), preview.entries.len());
                            let expected: BTreeSet<DocumentNumber> = seed
                                .iter()
                                .map(|n| if request.contains(*n) { n + shift } else { *n })
                                .collect();
                            let actual: BTreeSet<DocumentNumber> =
                                numbers(&conn, period).into_iter().collect();
                            assert_eq!(actual, expected, "{seed:?} {request}");
                            assert_eq!(actual.len(), seed.len());
                        }
                    }
                }
            }
        }
    }
}
