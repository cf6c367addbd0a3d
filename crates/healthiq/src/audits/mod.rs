//! Audit wizard drafts: a facility audit is opened against a criterion set,
//! rated one criterion at a time with live per-category progress, and
//! submitted as a completed audit record.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{AuditDraft, AuditStart, DraftId, DraftProgress, DraftView, RatingUpdate};
pub use repository::{AuditRepository, RepositoryError};
pub use router::audit_router;
pub use service::{AuditService, AuditServiceError};
