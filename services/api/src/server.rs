use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAuditRepository};
use crate::routes::with_api_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use healthiq::audits::AuditService;
use healthiq::config::AppConfig;
use healthiq::error::AppError;
use healthiq::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        analytics: config.analytics,
    };

    let repository = Arc::new(InMemoryAuditRepository::default());
    let audit_service = Arc::new(AuditService::new(repository));

    let app = with_api_routes(audit_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        tolerance_pct = config.analytics.benchmark_tolerance_pct,
        "healthiq analytics service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
