use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::analytics::records::ScoredRecord;
use crate::analytics::scoring::Criterion;
use crate::audits::domain::{AuditDraft, AuditStart, DraftId};
use crate::audits::repository::{AuditRepository, RepositoryError};
use crate::audits::{audit_router, AuditService};

pub(super) fn audit_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 14).expect("valid date")
}

pub(super) fn criteria() -> Vec<Criterion> {
    vec![
        Criterion::new("env-1", "Environment", 3.0).with_description("Clean common areas"),
        Criterion::new("env-2", "Environment", 1.0).with_description("Secure storage"),
        Criterion::new("doc-1", "Documentation", 2.0),
    ]
}

pub(super) fn start_request() -> AuditStart {
    AuditStart {
        facility_id: "12".to_string(),
        facility_name: Some("Maple House".to_string()),
        audit_date: audit_date(),
        criteria: criteria(),
        notes: Some("quarterly walkthrough".to_string()),
    }
}

pub(super) fn build_service() -> (AuditService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AuditService::new(repository.clone());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) drafts: Arc<Mutex<HashMap<DraftId, AuditDraft>>>,
    pub(super) records: Arc<Mutex<Vec<ScoredRecord>>>,
}

impl AuditRepository for MemoryRepository {
    fn insert_draft(&self, draft: AuditDraft) -> Result<AuditDraft, RepositoryError> {
        let mut guard = self.drafts.lock().expect("repository mutex poisoned");
        if guard.contains_key(&draft.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(draft.id.clone(), draft.clone());
        Ok(draft)
    }


    fn fetch_draft(&self, id: &DraftId) -> Result<Option<AuditDraft>, RepositoryError> {
        let guard = self.drafts.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn modify_draft(
        &self,
        id: &DraftId,
        apply: &mut dyn FnMut(&mut AuditDraft),
    ) -> Result<Option<AuditDraft>, RepositoryError> {
        let mut guard = self.drafts.lock().expect("repository mutex poisoned");
        Ok(guard.get_mut(id).map(|draft| {
            apply(draft);
            draft.clone()
        }))
    }

    fn take_draft(&self, id: &DraftId) -> Result<Option<AuditDraft>, RepositoryError> {
        let mut guard = self.drafts.lock().expect("repository mutex poisoned");
        Ok(guard.remove(id))
    }

    fn insert_record(&self, record: ScoredRecord) -> Result<ScoredRecord, RepositoryError> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .push(record.clone());
        Ok(record)
    }

    fn records(&self) -> Result<Vec<ScoredRecord>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }
}

pub(super) struct UnavailableRepository;

impl AuditRepository for UnavailableRepository {
    fn insert_draft(&self, _draft: AuditDraft) -> Result<AuditDraft, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }


    fn fetch_draft(&self, _id: &DraftId) -> Result<Option<AuditDraft>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn modify_draft(
        &self,
        _id: &DraftId,
        _apply: &mut dyn FnMut(&mut AuditDraft),
    ) -> Result<Option<AuditDraft>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn take_draft(&self, _id: &DraftId) -> Result<Option<AuditDraft>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_record(&self, _record: ScoredRecord) -> Result<ScoredRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn records(&self) -> Result<Vec<ScoredRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: AuditService<MemoryRepository>) -> axum::Router {
    audit_router(Arc::new(service))
}
