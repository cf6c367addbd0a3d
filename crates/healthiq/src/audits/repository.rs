use super::domain::{AuditDraft, DraftId};
use crate::analytics::records::ScoredRecord;

/// Storage abstraction for drafts and the audit records they produce.
///
/// `modify_draft` and `take_draft` must be atomic with respect to each other:
/// a draft taken by one caller is never visible to a concurrent one.
pub trait AuditRepository: Send + Sync {
    fn insert_draft(&self, draft: AuditDraft) -> Result<AuditDraft, RepositoryError>;
    fn fetch_draft(&self, id: &DraftId) -> Result<Option<AuditDraft>, RepositoryError>;
    /// Applies `apply` to the stored draft and returns the updated copy.
    fn modify_draft(
        &self,
        id: &DraftId,
        apply: &mut dyn FnMut(&mut AuditDraft),
    ) -> Result<Option<AuditDraft>, RepositoryError>;
    /// Removes the draft and hands it to the caller.
    fn take_draft(&self, id: &DraftId) -> Result<Option<AuditDraft>, RepositoryError>;
    fn insert_record(&self, record: ScoredRecord) -> Result<ScoredRecord, RepositoryError>;
    fn records(&self) -> Result<Vec<ScoredRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
