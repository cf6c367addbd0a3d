use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{AuditDraft, AuditStart, DraftId, DraftProgress, RatingUpdate};
use super::repository::{AuditRepository, RepositoryError};
use crate::analytics::records::{RecordError, RecordKind, RecordStatus, ScoredRecord};
use crate::analytics::scoring::{
    CriterionId, CriterionRating, RatingSheet, ScoreCalculator, ScoringError,
};

/// Drives an audit from first rating to a completed, scored record.
pub struct AuditService<R> {
    repository: Arc<R>,
}

static DRAFT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static AUDIT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_draft_id() -> DraftId {
    let id = DRAFT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DraftId(format!("draft-{id:06}"))
}

fn next_audit_id() -> String {
    let id = AUDIT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("audit-{id:06}")
}

impl<R> AuditService<R>
where
    R: AuditRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn start(&self, request: AuditStart) -> Result<AuditDraft, AuditServiceError> {
        if request.facility_id.trim().is_empty() {
            return Err(AuditServiceError::MissingFacility);
        }
        if request.criteria.is_empty() {
            return Err(AuditServiceError::NoCriteria);
        }

        let calculator = ScoreCalculator::new(request.criteria)?;
        let draft = AuditDraft {
            id: next_draft_id(),
            facility_id: request.facility_id.trim().to_string(),
            facility_name: request
                .facility_name
                .filter(|name| !name.trim().is_empty()),
            audit_date: request.audit_date,
            notes: request.notes,
            calculator,
            sheet: RatingSheet::new(),
        };

        Ok(self.repository.insert_draft(draft)?)
    }

    pub fn get(&self, draft_id: &DraftId) -> Result<AuditDraft, AuditServiceError> {
        let draft = self
            .repository
            .fetch_draft(draft_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(draft)
    }

    /// Records or replaces the rating for one criterion of the draft.
    pub fn rate(
        &self,
        draft_id: &DraftId,
        criterion_id: CriterionId,
        update: RatingUpdate,
    ) -> Result<DraftProgress, AuditServiceError> {
        if !self.get(draft_id)?.calculator.contains(&criterion_id) {
            return Err(AuditServiceError::UnknownCriterion(criterion_id));
        }

        let mut rating = Some(
            CriterionRating::new(criterion_id.0, update.rating).with_notes(update.notes),
        );
        let draft = self
            .repository
            .modify_draft(draft_id, &mut |draft| {
                if let Some(rating) = rating.take() {
                    draft.sheet.set(rating);
                }
            })?
            .ok_or(RepositoryError::NotFound)?;
        Ok(draft.progress())
    }

    pub fn progress(&self, draft_id: &DraftId) -> Result<DraftProgress, AuditServiceError> {
        Ok(self.get(draft_id)?.progress())
    }

    /// Scores the draft, stores the completed audit, and discards the draft.
    ///
    /// The draft is taken out of the repository before anything is stored, so
    /// only one submit of a draft can succeed. It is put back if the audit
    /// cannot be stored.
    pub fn submit(&self, draft_id: &DraftId) -> Result<ScoredRecord, AuditServiceError> {
        let draft = self
            .repository
            .take_draft(draft_id)?
            .ok_or(RepositoryError::NotFound)?;

        let stored = build_record(&draft).and_then(|record| {
            self.repository
                .insert_record(record)
                .map_err(AuditServiceError::from)
        });
        let stored = match stored {
            Ok(stored) => stored,
            Err(error) => {
                if let Err(restore) = self.repository.insert_draft(draft) {
                    warn!(draft = %draft_id, error = %restore, "failed to restore audit draft");
                }
                return Err(error);
            }
        };

        info!(
            draft = %draft_id,
            audit = %stored.id,
            facility = %stored.facility_id,
            score = stored.score,
            "audit submitted"
        );
        Ok(stored)
    }

    pub fn records(&self) -> Result<Vec<ScoredRecord>, AuditServiceError> {
        Ok(self.repository.records()?)
    }
}

fn build_record(draft: &AuditDraft) -> Result<ScoredRecord, AuditServiceError> {
    let breakdown = draft.breakdown();
    if breakdown.rated == 0 {
        return Err(AuditServiceError::NothingRated);
    }

    let mut record = ScoredRecord::new(
        next_audit_id(),
        RecordKind::Audit,
        draft.facility_id.clone(),
        draft.audit_date,
        RecordStatus::Scheduled,
    );
    record.facility_name = draft.facility_name.clone();
    record.notes = draft.notes.clone();

    for component in breakdown.components.iter().filter(|component| component.counted) {
        let name = draft
            .criteria()
            .iter()
            .find(|criterion| criterion.id == component.criterion_id)
            .map(|criterion| criterion.description.trim())
            .filter(|description| !description.is_empty())
            .unwrap_or(component.criterion_id.as_str())
            .to_string();
        let value = component.value.map_or(0.0, f64::from);
        record = record.with_indicator(component.criterion_id.as_str(), name, value);
    }

    record.complete(f64::from(breakdown.score))?;
    Ok(record)
}

#[derive(Debug, thiserror::Error)]
pub enum AuditServiceError {
    #[error("audit needs a facility id")]
    MissingFacility,
    #[error("audit needs at least one criterion")]
    NoCriteria,
    #[error("criterion {0} is not part of this audit")]
    UnknownCriterion(CriterionId),
    #[error("audit has no scored ratings yet")]
    NothingRated,
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AuditServiceError {
    /// Errors caused by the request rather than by storage.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repository(_))
    }
}
