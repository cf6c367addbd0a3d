use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::json;

use super::domain::{AuditStart, DraftId, RatingUpdate};
use super::repository::{AuditRepository, RepositoryError};
use super::service::{AuditService, AuditServiceError};
use crate::analytics::scoring::CriterionId;

/// Routes for the audit wizard: open a draft, rate criteria, submit.
pub fn audit_router<R>(service: Arc<AuditService<R>>) -> Router
where
    R: AuditRepository + 'static,
{
    Router::new()
        .route("/api/v1/audits", post(start_handler::<R>))
        .route("/api/v1/audits/records", get(records_handler::<R>))
        .route("/api/v1/audits/:draft_id", get(draft_handler::<R>))
        .route(
            "/api/v1/audits/:draft_id/ratings/:criterion_id",
            put(rate_handler::<R>),
        )
        .route("/api/v1/audits/:draft_id/submit", post(submit_handler::<R>))
        .with_state(service)
}

pub(crate) async fn start_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    axum::Json(request): axum::Json<AuditStart>,
) -> Response
where
    R: AuditRepository + 'static,
{
    match service.start(request) {
        Ok(draft) => (StatusCode::CREATED, axum::Json(draft.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn draft_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Path(draft_id): Path<String>,
) -> Response
where
    R: AuditRepository + 'static,
{
    match service.get(&DraftId(draft_id)) {
        Ok(draft) => (StatusCode::OK, axum::Json(draft.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rate_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Path((draft_id, criterion_id)): Path<(String, String)>,
    axum::Json(update): axum::Json<RatingUpdate>,
) -> Response
where
    R: AuditRepository + 'static,
{
    match service.rate(&DraftId(draft_id), CriterionId(criterion_id), update) {
        Ok(progress) => (StatusCode::OK, axum::Json(progress)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Path(draft_id): Path<String>,
) -> Response
where
    R: AuditRepository + 'static,
{
    match service.submit(&DraftId(draft_id)) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn records_handler<R>(State(service): State<Arc<AuditService<R>>>) -> Response
where
    R: AuditRepository + 'static,
{
    match service.records() {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AuditServiceError) -> Response {
    let status = match &error {
        AuditServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AuditServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AuditServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
