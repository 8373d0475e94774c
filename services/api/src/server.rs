use crate::cli::ServeArgs;
use crate::infra::{insight_service, AppState};
use crate::routes::with_insight_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use talent_insights::config::AppConfig;
use talent_insights::error::AppError;
use talent_insights::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(model_dir) = args.source.model_dir.take() {
        config.insights.model_dir = model_dir;
    }
    if let Some(records) = args.source.records.take() {
        config.insights.records_path = Some(records);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = insight_service(&config.insights)?;

    let app = with_insight_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        model_dir = %config.insights.model_dir.display(),
        "talent insights service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
