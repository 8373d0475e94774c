use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::artifacts::ModelArtifactStore;
use super::service::{InsightService, InsightServiceError};
use super::store::HrRecordStore;
use super::trainer::TrainOutcome;

/// Router builder exposing employee and goal scoring plus the retraining trigger.
pub fn insights_router<S, M>(service: Arc<InsightService<S, M>>) -> Router
where
    S: HrRecordStore + 'static,
    M: ModelArtifactStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/insights/employee/:employee_id",
            get(employee_handler::<S, M>),
        )
        .route("/api/v1/insights/goal/:goal_id", get(goal_handler::<S, M>))
        .route("/api/v1/insights/train", post(train_handler::<S, M>))
        .with_state(service)
}

pub(crate) async fn employee_handler<S, M>(
    State(service): State<Arc<InsightService<S, M>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    S: HrRecordStore + 'static,
    M: ModelArtifactStore + 'static,
{
    match run_blocking(service, move |service| service.score_employee(&employee_id)).await {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn goal_handler<S, M>(
    State(service): State<Arc<InsightService<S, M>>>,
    Path(goal_id): Path<String>,
) -> Response
where
    S: HrRecordStore + 'static,
    M: ModelArtifactStore + 'static,
{
    match run_blocking(service, move |service| service.score_goal(&goal_id)).await {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn train_handler<S, M>(
    State(service): State<Arc<InsightService<S, M>>>,
) -> Response
where
    S: HrRecordStore + 'static,
    M: ModelArtifactStore + 'static,
{
    match run_blocking(service, |service| service.retrain()).await {
        Ok(TrainOutcome::Trained(summary)) => {
            let payload = json!({
                "status": "trained",
                "trained_at": summary.trained_at,
                "artifacts": summary.artifacts,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(TrainOutcome::NoTrainingData) => {
            let payload = json!({
                "status": "no_data",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(response) => response,
    }
}

/// Runs a synchronous service call on the blocking pool.
async fn run_blocking<S, M, T, F>(
    service: Arc<InsightService<S, M>>,
    job: F,
) -> Result<T, Response>
where
    S: HrRecordStore + 'static,
    M: ModelArtifactStore + 'static,
    T: Send + 'static,
    F: FnOnce(&InsightService<S, M>) -> Result<T, InsightServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || job(&service)).await {
        Ok(outcome) => outcome.map_err(error_response),
        Err(err) => {
            tracing::error!(error = %err, "insight task did not complete");
            let payload = json!({
                "error": "insight task did not complete",
            });
            Err((StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response())
        }
    }
}

fn error_response(err: InsightServiceError) -> Response {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        tracing::error!(error = %err, "insight request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
