use docshift_core::{
    analyze, DocumentNumber, MemoryLedger, PreviewStatus, RangeMutator, RenumberExecutor,
    RenumberSession, ScopeReader, SessionPhase, ShiftPlanner, ShiftRequest,
};
use std::collections::BTreeSet;

fn numbers_from_mask(mask: u32, width: DocumentNumber) -> Vec<DocumentNumber> {
    (1..=width)
        .filter(|n| mask & (1 << (n - 1)) != 0)
        .collect()
}

/// Every non-empty ledger of numbers up to 6, every range and shift up to 4:
/// a conflict-free analysis commits to `(old \ source) ∪ shifted`, and any
/// flagged conflict is rejected by the boundary without change.
#[test]
fn analysis_matches_boundary_for_all_small_ledgers() {
    for mask in 1u32..(1 << 6) {
        let seed = numbers_from_mask(mask, 6);
        for start in 1..=7 {
            for end in start..=7 {
                for shift in (-4..=4).filter(|shift| *shift != 0) {
                    let ledger = MemoryLedger::new();
                    let period = ledger.add_period_with_numbers(&seed);
                    let request = ShiftRequest::new(start, end, shift);
                    let snapshot = ledger.load_scope(period).unwrap();
                    let analysis = analyze(&snapshot, &request).unwrap();

                    let result = ledger.apply_shift(period, start, end, shift);
                    let after = ledger.numbers(period).unwrap();

                    if analysis.has_conflicts {
                        assert!(result.is_err(), "{seed:?} {request}");
                        assert_eq!(after, seed, "{seed:?} {request}");
                        continue;
                    }

                    assert_eq!(result.unwrap(), analysis.entries.len());
                    let expected: BTreeSet<DocumentNumber> = seed
                        .iter()
                        .filter(|n| !request.contains(**n))
                        .copied()
                        .chain(analysis.entries.iter().map(|entry| entry.new_number))
                        .collect();
                    assert_eq!(after.len(), seed.len(), "{seed:?} {request}");
                    assert_eq!(after.into_iter().collect::<BTreeSet<_>>(), expected);
                }
            }
        }
    }
}

#[test]
fn commit_and_inverse_round_trip() {
    let ledger = MemoryLedger::new();
    let seed = vec![1, 3, 4, 5, 8, 12];
    let period = ledger.add_period_with_numbers(&seed);
    let executor = RenumberExecutor::new(&ledger);

    for request in [
        ShiftRequest::new(3, 5, 2),
        ShiftRequest::new(8, 12, -1),
        ShiftRequest::new(1, 12, 100),
    ] {
        let preview = ShiftPlanner::new(&ledger).plan(period, request).unwrap();
        assert_eq!(preview.status, PreviewStatus::Valid, "{request}");

        executor.commit(period, request).unwrap();
        executor.commit(period, request.inverse().unwrap()).unwrap();
        assert_eq!(ledger.numbers(period).unwrap(), seed);
    }
}

#[test]
fn empty_range_session_blocks_commit() {
    let ledger = MemoryLedger::new();
    let period = ledger.add_period_with_numbers(&[1, 2, 3]);
    let mut session = RenumberSession::new(&ledger, period);

    let preview = session.update(ShiftRequest::new(10, 20, 1)).unwrap();
    assert_eq!(preview.status, PreviewStatus::EmptyRange);
    assert_eq!(session.phase(), SessionPhase::EmptyRange);

    let err = session.commit().unwrap_err();
    assert_eq!(err.code(), "empty_range");
    assert_eq!(ledger.numbers(period).unwrap(), vec![1, 2, 3]);
}

#[test]
fn preview_serializes_for_ui_callers() {
    let ledger = MemoryLedger::new();
    let period = ledger.add_period_with_numbers(&[1, 2, 3]);
    let preview = ShiftPlanner::new(&ledger)
        .plan(period, ShiftRequest::new(2, 3, -1))
        .unwrap();

    let value = serde_json::to_value(&preview).unwrap();
    assert_eq!(value["status"], "conflicted");
    assert_eq!(value["landing_zone"]["start"], 1);
    assert_eq!(value["landing_zone"]["end"], 1);
    assert_eq!(value["entries"][0]["old_number"], 2);
    assert_eq!(value["entries"][0]["conflict"], true);
    assert_eq!(value["entries"][1]["conflict"], false);
}
