//! Renumbering session for interactive callers.
//!
//! # Responsibility
//! - Drive `Idle -> Previewing -> {Valid, Conflicted, EmptyRange}
//!   -> Committing -> {Done, Failed}` for one renumbering dialog.
//! - Commit exactly the request of the latest committable preview.
//!
//! # Invariants
//! - Only a `Valid` session can commit.
//! - A failed commit leaves storage unchanged and drops the preview.
//! - `Done` is terminal.

use crate::model::period::PeriodId;
use crate::renumber::executor::{RangeMutator, RenumberExecutor, ShiftOutcome};
use crate::renumber::planner::{PreviewStatus, ShiftPlanner, ShiftPreview};
use crate::renumber::scope::ScopeReader;
use crate::renumber::{RenumberError, RenumberResult, ShiftRequest};
use log::warn;

/// Observable phase of a [`RenumberSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No preview requested yet.
    Idle,
    /// A preview is being computed or the last one failed validation.
    Previewing,
    /// Latest preview can be committed.
    Valid,
    /// Latest preview has conflicting documents.
    Conflicted,
    /// Latest preview matched no documents.
    EmptyRange,
    /// Commit in progress.
    Committing,
    /// Commit succeeded.
    Done,
    /// Last commit failed; storage is unchanged and a new preview is needed.
    Failed,
}

/// One renumbering interaction against one period.
pub struct RenumberSession<S: ScopeReader + RangeMutator> {
    store: S,
    period_uuid: PeriodId,
    phase: SessionPhase,
    preview: Option<ShiftPreview>,
    outcome: Option<ShiftOutcome>,
}

impl<S: ScopeReader + RangeMutator> RenumberSession<S> {
    pub fn new(store: S, period_uuid: PeriodId) -> Self {
        Self {
            store,
            period_uuid,
            phase: SessionPhase::Idle,
            preview: None,
            outcome: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn preview(&self) -> Option<&ShiftPreview> {
        self.preview.as_ref()
    }

    pub fn outcome(&self) -> Option<&ShiftOutcome> {
        self.outcome.as_ref()
    }

    /// Recomputes the preview for new input. Safe to call on every edit.
    ///
    /// # Errors
    /// - `SessionFinished` after a successful commit.
    /// - Planner errors; the session then stays in `Previewing` without a
    ///   preview.
    pub fn update(&mut self, request: ShiftRequest) -> RenumberResult<&ShiftPreview> {
        if self.phase == SessionPhase::Done {
            return Err(RenumberError::SessionFinished);
        }

        self.phase = SessionPhase::Previewing;
        self.preview = None;

        let preview = ShiftPlanner::new(&self.store).plan(self.period_uuid, request)?;
        self.phase = match preview.status {
            PreviewStatus::Valid => SessionPhase::Valid,
            PreviewStatus::Conflicted => SessionPhase::Conflicted,
            PreviewStatus::EmptyRange => SessionPhase::EmptyRange,
        };
        Ok(&*self.preview.insert(preview))
    }

    /// Commits the latest preview.
    ///
    /// # Errors
    /// - `IdentifierConflict` / `EmptyRange` when the preview is not
    ///   committable; storage is not touched.
    /// - `NotPreviewed` without a current preview.
    /// - `SessionFinished` after a successful commit.
    /// - Executor errors; the session moves to `Failed`.
    pub fn commit(&mut self) -> RenumberResult<ShiftOutcome> {
        let request = match (self.phase, self.preview.as_ref()) {
            (SessionPhase::Done, _) => return Err(RenumberError::SessionFinished),
            (SessionPhase::Valid, Some(preview)) => preview.request,
            (SessionPhase::Conflicted, Some(preview)) => {
                return Err(RenumberError::IdentifierConflict {
                    numbers: preview.conflicting_numbers(),
                });
            }
            (SessionPhase::EmptyRange, Some(preview)) => {
                return Err(RenumberError::EmptyRange {
                    start: preview.request.start,
                    end: preview.request.end,
                });
            }
            _ => return Err(RenumberError::NotPreviewed),
        };

        self.phase = SessionPhase::Committing;
        match RenumberExecutor::new(&self.store).commit(self.period_uuid, request) {
            Ok(outcome) => {
                self.phase = SessionPhase::Done;
                self.outcome = Some(outcome);
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    "event=renumber_session module=service status=failed period={} error_code={}",
                    self.period_uuid,
                    err.code()
                );
                self.phase = SessionPhase::Failed;
                self.preview = None;
                Err(err)
            }
        }
    }
}
