//! Conflict analysis for a contiguous range shift.
//!
//! The whole source block moves at once, so a shifted number can only clash
//! with a number that stays put. The landing zone is therefore clamped to
//! exclude the source range: numbers that land back inside it belong to
//! documents that are themselves moving.
//!
//! # Invariants
//! - Analysis is pure: no storage access, no mutation.
//! - A shifted number below 1 is always a conflict.

use super::scope::ScopeSnapshot;
use super::{RenumberResult, ShiftRequest};
use crate::model::document::{DocumentId, DocumentNumber};
use serde::{Deserialize, Serialize};

/// Destination range of a shift, clamped against the source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingZone {
    pub start: DocumentNumber,
    pub end: DocumentNumber,
}

impl LandingZone {
    /// Computes the clamped landing zone for an already validated request.
    pub fn for_request(request: &ShiftRequest) -> Self {
        let mut start = request.start + request.shift;
        let mut end = request.end + request.shift;
        if request.shift < 0 {
            end = end.min(request.start - 1);
        } else {
            start = start.max(request.end + 1);
        }
        Self { start, end }
    }

    pub fn contains(&self, number: DocumentNumber) -> bool {
        (self.start..=self.end).contains(&number)
    }
}

/// Old/new number pair of one moving document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftEntry {
    pub document_uuid: DocumentId,
    pub old_number: DocumentNumber,
    pub new_number: DocumentNumber,
    pub conflict: bool,
}

/// Result of analysing one request against one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAnalysis {
    pub landing_zone: LandingZone,
    pub entries: Vec<ShiftEntry>,
    pub has_conflicts: bool,
}

impl ShiftAnalysis {
    /// No document matched the source range.
    pub fn is_empty_range(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Analyses `request` against the numbers currently used in `snapshot`.
///
/// # Errors
/// - `NoOpShift` / `InvalidRange` from [`ShiftRequest::validate`].
///
/// An empty source range is not an error here; it is reported through
/// [`ShiftAnalysis::is_empty_range`].
pub fn analyze(snapshot: &ScopeSnapshot, request: &ShiftRequest) -> RenumberResult<ShiftAnalysis> {
    request.validate()?;

    let landing_zone = LandingZone::for_request(request);
    let numbers = snapshot.numbers();

    let entries: Vec<ShiftEntry> = snapshot
        .documents_in(request.start, request.end)
        .map(|document| {
            let new_number = document.number + request.shift;
            let conflict = new_number < 1
                || (landing_zone.contains(new_number) && numbers.contains(&new_number));
            ShiftEntry {
                document_uuid: document.uuid,
                old_number: document.number,
                new_number,
                conflict,
            }
        })
        .collect();
    let has_conflicts = entries.iter().any(|entry| entry.conflict);

    Ok(ShiftAnalysis {
        landing_zone,
        entries,
        has_conflicts,
    })
}
