use super::common::*;
use crate::analytics::rating::{Rating, ScoreBand};
use crate::analytics::records::{RecordKind, RecordStatus, ScoredRecord};
use crate::analytics::scoring::{Criterion, CriterionId, ScoringError};
use crate::audits::domain::{AuditDraft, DraftId, RatingUpdate};
use crate::audits::repository::{AuditRepository, RepositoryError};
use crate::audits::{AuditService, AuditServiceError};
use std::sync::{Arc, Barrier};
use std::thread;

fn update(rating: Rating) -> RatingUpdate {
    RatingUpdate {
        rating,
        notes: String::new(),
    }
}

#[test]
fn rating_updates_live_progress() {
    let (service, _) = build_service();
    let draft = service.start(start_request()).expect("draft opens");

    let progress = service
        .rate(&draft.id, CriterionId::from("env-1"), update(Rating::Pass))
        .expect("rating stored");
    assert_eq!(progress.score, 100);
    assert_eq!(progress.answered, 1);
    assert_eq!(progress.total, 3);
    assert!(progress.ready_to_submit);

    let progress = service
        .rate(&draft.id, CriterionId::from("env-2"), update(Rating::Fail))
        .expect("rating stored");
    assert_eq!(progress.score, 75);
    assert_eq!(progress.band, ScoreBand::Good);
    assert_eq!(progress.categories[0].completion_pct, 100);
    assert_eq!(progress.categories[1].answered, 0);

    let progress = service
        .rate(&draft.id, CriterionId::from("env-2"), update(Rating::NotApplicable))
        .expect("rating replaced");
    assert_eq!(progress.score, 100);
    assert_eq!(service.progress(&draft.id).expect("progress"), progress);
}

#[test]
fn rate_rejects_unknown_criteria() {
    let (service, _) = build_service();
    let draft = service.start(start_request()).expect("draft opens");

    match service.rate(&draft.id, CriterionId::from("ghost"), update(Rating::Pass)) {
        Err(AuditServiceError::UnknownCriterion(id)) => assert_eq!(id.as_str(), "ghost"),
        other => panic!("expected unknown criterion, got {other:?}"),
    }
}

#[test]
fn start_validates_criteria() {
    let (service, _) = build_service();

    let mut request = start_request();
    request.criteria.push(Criterion::new("env-1", "Environment", 1.0));
    match service.start(request) {
        Err(AuditServiceError::Scoring(ScoringError::DuplicateCriterion(_))) => {}
        other => panic!("expected duplicate criterion, got {other:?}"),
    }

    let mut request = start_request();
    request.criteria.clear();
    assert!(matches!(
        service.start(request),
        Err(AuditServiceError::NoCriteria)
    ));
}

#[test]
fn submit_requires_a_scored_rating() {
    let (service, _) = build_service();
    let draft = service.start(start_request()).expect("draft opens");
    service
        .rate(&draft.id, CriterionId::from("doc-1"), update(Rating::NotApplicable))
        .expect("rating stored");

    assert!(matches!(
        service.submit(&draft.id),
        Err(AuditServiceError::NothingRated)
    ));
    assert!(service.get(&draft.id).is_ok(), "draft survives a refused submit");
}

#[test]
fn submit_stores_completed_audit_and_drops_draft() {
    let (service, repository) = build_service();
    let draft = service.start(start_request()).expect("draft opens");
    service
        .rate(&draft.id, CriterionId::from("env-1"), update(Rating::Good))
        .expect("rating stored");
    service
        .rate(&draft.id, CriterionId::from("doc-1"), update(Rating::Partial))
        .expect("rating stored");

    let record = service.submit(&draft.id).expect("submit succeeds");

    // (75 * 3 + 50 * 2) / 5 = 65
    assert_eq!(record.score, 65.0);
    assert_eq!(record.kind, RecordKind::Audit);
    assert_eq!(record.status, RecordStatus::Completed);
    assert_eq!(record.facility_label(), "Maple House");
    assert_eq!(record.indicator_scores.len(), 2);
    assert_eq!(record.indicator_scores[0].criterion_name, "Clean common areas");
    assert_eq!(record.indicator_scores[1].criterion_name, "doc-1");

    assert_eq!(repository.records().expect("records").len(), 1);
    match service.get(&draft.id) {
        Err(AuditServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected draft removal, got {other:?}"),
    }
}

#[test]
fn repository_failures_surface_as_server_errors() {
    let service = AuditService::new(Arc::new(UnavailableRepository));
    let error = service
        .get(&DraftId("draft-x".to_string()))
        .expect_err("repository offline");
    assert!(!error.is_client_error());
    assert!(service.records().is_err());
}

/// Holds every caller at the draft lookup until both have arrived.
struct LockstepRepository {
    inner: MemoryRepository,
    gate: Barrier,
}

impl LockstepRepository {
    fn new(inner: MemoryRepository) -> Self {
        Self {
            inner,
            gate: Barrier::new(2),
        }
    }
}

impl AuditRepository for LockstepRepository {
    fn insert_draft(&self, draft: AuditDraft) -> Result<AuditDraft, RepositoryError> {
        self.inner.insert_draft(draft)
    }

    fn fetch_draft(&self, id: &DraftId) -> Result<Option<AuditDraft>, RepositoryError> {
        let draft = self.inner.fetch_draft(id);
        self.gate.wait();
        draft
    }

    fn modify_draft(
        &self,
        id: &DraftId,
        apply: &mut dyn FnMut(&mut AuditDraft),
    ) -> Result<Option<AuditDraft>, RepositoryError> {
        self.inner.modify_draft(id, apply)
    }

    fn take_draft(&self, id: &DraftId) -> Result<Option<AuditDraft>, RepositoryError> {
        self.gate.wait();
        self.inner.take_draft(id)
    }

    fn insert_record(&self, record: ScoredRecord) -> Result<ScoredRecord, RepositoryError> {
        self.inner.insert_record(record)
    }

    fn records(&self) -> Result<Vec<ScoredRecord>, RepositoryError> {
        self.inner.records()
    }
}

/// Accepts drafts but refuses to store audits.
struct RecordOutageRepository(MemoryRepository);

impl AuditRepository for RecordOutageRepository {
    fn insert_draft(&self, draft: AuditDraft) -> Result<AuditDraft, RepositoryError> {
        self.0.insert_draft(draft)
    }

    fn fetch_draft(&self, id: &DraftId) -> Result<Option<AuditDraft>, RepositoryError> {
        self.0.fetch_draft(id)
    }

    fn modify_draft(
        &self,
        id: &DraftId,
        apply: &mut dyn FnMut(&mut AuditDraft),
    ) -> Result<Option<AuditDraft>, RepositoryError> {
        self.0.modify_draft(id, apply)
    }

    fn take_draft(&self, id: &DraftId) -> Result<Option<AuditDraft>, RepositoryError> {
        self.0.take_draft(id)
    }

    fn insert_record(&self, _record: ScoredRecord) -> Result<ScoredRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("audit store offline".to_string()))
    }

    fn records(&self) -> Result<Vec<ScoredRecord>, RepositoryError> {
        self.0.records()
    }
}

fn rated_draft<R: AuditRepository + 'static>(service: &AuditService<R>) -> DraftId {
    let draft = service.start(start_request()).expect("draft opens");
    service
        .rate(&draft.id, CriterionId::from("env-1"), update(Rating::Pass))
        .expect("rating stored");
    draft.id
}

#[test]
fn second_submit_of_a_draft_is_not_found() {
    let (service, repository) = build_service();
    let draft_id = rated_draft(&service);

    service.submit(&draft_id).expect("first submit succeeds");
    match service.submit(&draft_id) {
        Err(AuditServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected missing draft, got {other:?}"),
    }
    assert_eq!(repository.records().expect("records").len(), 1);
}

#[test]
fn concurrent_submits_store_exactly_one_audit() {
    let memory = MemoryRepository::default();
    let draft_id = rated_draft(&AuditService::new(Arc::new(memory.clone())));
    let service = AuditService::new(Arc::new(LockstepRepository::new(memory.clone())));
    let (service, draft_id) = (&service, &draft_id);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| scope.spawn(move || service.submit(draft_id)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("submit thread"))
            .collect()
    });

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(results.iter().any(|result| matches!(
        result,
        Err(AuditServiceError::Repository(RepositoryError::NotFound))
    )));
    assert_eq!(memory.records().expect("records").len(), 1);
}

#[test]
fn concurrent_ratings_are_both_kept() {
    let memory = MemoryRepository::default();
    let draft = AuditService::new(Arc::new(memory.clone()))
        .start(start_request())
        .expect("draft opens");
    let service = AuditService::new(Arc::new(LockstepRepository::new(memory.clone())));

    thread::scope(|scope| {
        let env = scope.spawn(|| {
            service.rate(&draft.id, CriterionId::from("env-1"), update(Rating::Pass))
        });
        let doc = scope.spawn(|| {
            service.rate(&draft.id, CriterionId::from("doc-1"), update(Rating::Fail))
        });
        env.join().expect("env thread").expect("env rating stored");
        doc.join().expect("doc thread").expect("doc rating stored");
    });

    let stored = memory
        .fetch_draft(&draft.id)
        .expect("fetch")
        .expect("draft present");
    assert_eq!(stored.sheet().len(), 2);
    // (100 * 3 + 0 * 2) / 5 = 60
    assert_eq!(stored.progress().score, 60);
}

#[test]
fn failed_audit_store_keeps_the_draft() {
    let memory = MemoryRepository::default();
    let service = AuditService::new(Arc::new(RecordOutageRepository(memory.clone())));
    let draft_id = rated_draft(&service);

    let error = service.submit(&draft_id).expect_err("record store offline");
    assert!(!error.is_client_error());

    let draft = service.get(&draft_id).expect("draft restored");
    assert_eq!(draft.sheet().len(), 1);
    assert!(memory.records().expect("records").is_empty());
}
