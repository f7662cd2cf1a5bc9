//! Shift planning: validation, scope loading and preview assembly.
//!
//! # Invariants
//! - Planning never mutates storage and can be repeated freely.
//! - `NoOpShift` and `InvalidRange` are reported before the scope is loaded.
//! - An empty source range short-circuits before the conflict scan.

use super::conflict::{analyze, LandingZone, ShiftEntry};
use super::scope::ScopeReader;
use super::{RenumberResult, ShiftRequest};
use crate::model::document::DocumentNumber;
use crate::model::period::PeriodId;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Overall verdict of a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewStatus {
    /// Every document can move; commit is allowed.
    Valid,
    /// At least one document would collide.
    Conflicted,
    /// No document lies in the source range.
    EmptyRange,
}

/// Preview of one shift within one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftPreview {
    pub period_uuid: PeriodId,
    pub request: ShiftRequest,
    /// `None` when the range is empty and analysis was skipped.
    pub landing_zone: Option<LandingZone>,
    /// Moving documents in number order.
    pub entries: Vec<ShiftEntry>,
    pub status: PreviewStatus,
}

impl ShiftPreview {
    pub fn can_commit(&self) -> bool {
        self.status == PreviewStatus::Valid
    }

    pub fn has_conflicts(&self) -> bool {
        self.status == PreviewStatus::Conflicted
    }

    /// Old numbers of the documents flagged as conflicting.
    pub fn conflicting_numbers(&self) -> Vec<DocumentNumber> {
        self.entries
            .iter()
            .filter(|entry| entry.conflict)
            .map(|entry| entry.old_number)
            .collect()
    }
}

/// Builds previews from a scope reader.
pub struct ShiftPlanner<R: ScopeReader> {
    reader: R,
}

impl<R: ScopeReader> ShiftPlanner<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Plans `request` within `period_uuid`.
    ///
    /// # Errors
    /// - `NoOpShift`, `InvalidRange` for malformed input (no storage access).
    /// - `ScopeNotFound` when the period does not exist.
    /// - `Persistence` when the scope cannot be read.
    pub fn plan(
        &self,
        period_uuid: PeriodId,
        request: ShiftRequest,
    ) -> RenumberResult<ShiftPreview> {
        request.validate()?;

        let snapshot = self.reader.load_scope(period_uuid)?;

        if snapshot
            .documents_in(request.start, request.end)
            .next()
            .is_none()
        {
            info!(
                "event=renumber_preview module=renumber status=empty_range period={period_uuid} start={} end={} shift={}",
                request.start, request.end, request.shift
            );
            return Ok(ShiftPreview {
                period_uuid: snapshot.period_uuid(),
                request,
                landing_zone: None,
                entries: Vec::new(),
                status: PreviewStatus::EmptyRange,
            });
        }

        let analysis = analyze(&snapshot, &request)?;
        let status = if analysis.has_conflicts {
            PreviewStatus::Conflicted
        } else {
            PreviewStatus::Valid
        };
        let preview = ShiftPreview {
            period_uuid: snapshot.period_uuid(),
            request,
            landing_zone: Some(analysis.landing_zone),
            entries: analysis.entries,
            status,
        };

        if preview.has_conflicts() {
            warn!(
                "event=renumber_preview module=renumber status=conflicted period={period_uuid} start={} end={} shift={} entries={} conflicts={}",
                request.start,
                request.end,
                request.shift,
                preview.entries.len(),
                preview.conflicting_numbers().len()
            );
        } else {
            info!(
                "event=renumber_preview module=renumber status=ok period={period_uuid} start={} end={} shift={} entries={}",
                request.start,
                request.end,
                request.shift,
                preview.entries.len()
            );
        }
        Ok(preview)
    }
}
