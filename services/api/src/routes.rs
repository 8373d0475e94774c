use crate::infra::{AppState, Insights};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;
use std::sync::Arc;
use talent_insights::error::AppError;
use talent_insights::insights::{insights_router, write_dataset_csv};

pub(crate) fn with_insight_routes(service: Arc<Insights>) -> axum::Router {
    insights_router(Arc::clone(&service))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/insights/dataset",
            axum::routing::get(dataset_endpoint),
        )
        .layer(Extension(service))
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

/// The labelled training dataset as CSV, for offline inspection.
pub(crate) async fn dataset_endpoint(
    Extension(service): Extension<Arc<Insights>>,
) -> Result<impl IntoResponse, AppError> {
    let rows = service.training_dataset()?;
    let mut buffer = Vec::new();
    write_dataset_csv(&rows, &mut buffer)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        buffer,
    ))
}
