use crate::infra::{deserialize_optional_date, projection_days, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use healthiq::analytics::benchmark::{
    analyze_gaps, compare_facilities, improvement_plan, rank_facilities, BenchmarkComparator,
    BenchmarkMetric, Comparison, FacilityComparison, FacilityMetrics, FacilityRanking,
    ImprovementPlan, ImprovementProjection, MetricTarget, PerformanceGap,
};
use healthiq::analytics::records::{RecordKind, ScoredRecord};
use healthiq::analytics::scoring::{
    CategoryProgress, Criterion, CriterionRating, RatingSheet, ScoreBreakdown, ScoreCalculator,
};
use healthiq::analytics::stats::{
    aggregate, average_score, completion_rate, GroupBy, NamedBucket, RecordStatistics, StatsQuery,
};
use healthiq::audits::{audit_router, AuditRepository, AuditService};
use healthiq::error::AppError;
use healthiq::imports::{RecordExporter, RecordImporter, SkippedRow};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

pub(crate) fn with_api_routes<R>(service: Arc<AuditService<R>>) -> axum::Router
where
    R: AuditRepository + 'static,
{
    audit_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/scoring/score", axum::routing::post(score_endpoint))
        .route(
            "/api/v1/reports/aggregate",
            axum::routing::post(aggregate_endpoint),
        )
        .route(
            "/api/v1/reports/statistics",
            axum::routing::post(statistics_endpoint),
        )
        .route("/api/v1/reports/export", axum::routing::post(export_endpoint))
        .route(
            "/api/v1/benchmarks/compare",
            axum::routing::post(compare_endpoint),
        )
        .route(
            "/api/v1/benchmarks/projection",
            axum::routing::post(projection_endpoint),
        )
        .route("/api/v1/benchmarks/gaps", axum::routing::post(gaps_endpoint))
        .route(
            "/api/v1/benchmarks/rankings",
            axum::routing::post(rankings_endpoint),
        )
        .route(
            "/api/v1/benchmarks/facilities/compare",
            axum::routing::post(facility_comparison_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) criteria: Vec<Criterion>,
    pub(crate) ratings: Vec<CriterionRating>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    #[serde(flatten)]
    pub(crate) breakdown: ScoreBreakdown,
    pub(crate) categories: Vec<CategoryProgress>,
}

pub(crate) async fn score_endpoint(
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    Ok(Json(score_ratings(payload)?))
}

pub(crate) fn score_ratings(payload: ScoreRequest) -> Result<ScoreResponse, AppError> {
    let calculator = ScoreCalculator::new(payload.criteria)?;
    let sheet = RatingSheet::from_ratings(payload.ratings)?;
    Ok(ScoreResponse {
        breakdown: calculator.score(&sheet),
        categories: calculator.category_progress(&sheet),
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct AggregateRequest {
    pub(crate) records: Vec<ScoredRecord>,
    pub(crate) group_by: GroupBy,
}

#[derive(Debug, Serialize)]
pub(crate) struct AggregateResponse {
    pub(crate) group_by: GroupBy,
    pub(crate) total: usize,
    pub(crate) average_score: f64,
    pub(crate) completion_rate: f64,
    pub(crate) buckets: Vec<NamedBucket>,
}

pub(crate) async fn aggregate_endpoint(Json(payload): Json<AggregateRequest>) -> Json<AggregateResponse> {
    let AggregateRequest { records, group_by } = payload;
    Json(AggregateResponse {
        group_by,
        total: records.len(),
        average_score: average_score(&records),
        completion_rate: completion_rate(&records),
        buckets: aggregate(&records, group_by),
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatisticsRequest {
    #[serde(default)]
    pub(crate) records: Vec<ScoredRecord>,
    #[serde(default)]
    pub(crate) records_csv: Option<String>,
    #[serde(default)]
    pub(crate) kind: Option<RecordKind>,
    #[serde(flatten)]
    pub(crate) query: StatsQuery,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatisticsResponse {
    #[serde(flatten)]
    pub(crate) statistics: RecordStatistics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) skipped_rows: Vec<SkippedRow>,
}

pub(crate) async fn statistics_endpoint(
    Json(payload): Json<StatisticsRequest>,
) -> Result<Json<StatisticsResponse>, AppError> {
    let StatisticsRequest {
        mut records,
        records_csv,
        kind,
        query,
    } = payload;

    let mut skipped_rows = Vec::new();
    if let Some(csv) = records_csv {
        let kind = kind.unwrap_or(RecordKind::Assessment);
        let import = RecordImporter::from_reader(Cursor::new(csv.into_bytes()), kind)?;
        records.extend(import.records);
        skipped_rows = import.skipped;
    }

    Ok(Json(StatisticsResponse {
        statistics: RecordStatistics::compute(&records, &query),
        skipped_rows,
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportRequest {
    pub(crate) records: Vec<ScoredRecord>,
}

pub(crate) async fn export_endpoint(
    Json(payload): Json<ExportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let csv = RecordExporter::to_csv_string(&payload.records)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        csv,
    ))
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompareRequest {
    pub(crate) actual: f64,
    pub(crate) target: f64,
    #[serde(default)]
    pub(crate) lower_is_better: bool,
    #[serde(default)]
    pub(crate) tolerance_pct: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompareResponse {
    #[serde(flatten)]
    pub(crate) comparison: Comparison,
    pub(crate) status_label: &'static str,
    pub(crate) tolerance_pct: f64,
}

pub(crate) async fn compare_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<CompareRequest>,
) -> Json<CompareResponse> {
    let comparator = match payload.tolerance_pct {
        Some(tolerance) => {
            BenchmarkComparator::new(tolerance, state.analytics.milestone_interval_days)
        }
        None => BenchmarkComparator::from_config(&state.analytics),
    };
    let comparison = comparator.compare(payload.actual, payload.target, payload.lower_is_better);
    Json(CompareResponse {
        status_label: comparison.status.label(),
        tolerance_pct: comparator.tolerance_pct(),
        comparison,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectionRequest {
    pub(crate) current: f64,
    pub(crate) target: f64,
    pub(crate) days_to_target: u32,
}

pub(crate) async fn projection_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ProjectionRequest>,
) -> Result<Json<ImprovementProjection>, AppError> {
    let days = projection_days(payload.days_to_target)?;
    let comparator = BenchmarkComparator::from_config(&state.analytics);
    Ok(Json(comparator.project(payload.current, payload.target, days)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct GapsRequest {
    pub(crate) metrics: Vec<MetricTarget>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GapsResponse {
    pub(crate) metrics: Vec<BenchmarkMetric>,
    pub(crate) gaps: Vec<PerformanceGap>,
    pub(crate) improvement_plan: Vec<ImprovementPlan>,
}

pub(crate) async fn gaps_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<GapsRequest>,
) -> Json<GapsResponse> {
    let comparator = BenchmarkComparator::from_config(&state.analytics);
    let metrics: Vec<BenchmarkMetric> = payload
        .metrics
        .into_iter()
        .map(|metric| comparator.evaluate(metric))
        .collect();

    Json(GapsResponse {
        gaps: analyze_gaps(&metrics),
        improvement_plan: improvement_plan(&metrics),
        metrics,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct RankingsRequest {
    pub(crate) records: Vec<ScoredRecord>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) previous_ranks: HashMap<String, u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankingsResponse {
    pub(crate) as_of: NaiveDate,
    pub(crate) rankings: Vec<FacilityRanking>,
}

pub(crate) async fn rankings_endpoint(Json(payload): Json<RankingsRequest>) -> Json<RankingsResponse> {
    let as_of = payload
        .as_of
        .unwrap_or_else(|| Local::now().date_naive());
    let metrics = FacilityMetrics::for_all(&payload.records, as_of);
    Json(RankingsResponse {
        as_of,
        rankings: rank_facilities(&metrics, &payload.previous_ranks),
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct FacilityComparisonRequest {
    pub(crate) records: Vec<ScoredRecord>,
    pub(crate) facility_a: String,
    pub(crate) facility_b: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
}

pub(crate) async fn facility_comparison_endpoint(
    Json(payload): Json<FacilityComparisonRequest>,
) -> Result<Json<FacilityComparison>, AppError> {
    if payload.facility_a == payload.facility_b {
        return Err(AppError::InvalidInput(
            "facility_a and facility_b must differ".to_string(),
        ));
    }

    let as_of = payload
        .as_of
        .unwrap_or_else(|| Local::now().date_naive());
    Ok(Json(compare_facilities(
        FacilityMetrics::from_records(&payload.records, &payload.facility_a, as_of),
        FacilityMetrics::from_records(&payload.records, &payload.facility_b, as_of),
    )))
}
