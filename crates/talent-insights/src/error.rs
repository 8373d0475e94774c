use crate::config::ConfigError;
use crate::insights::InsightServiceError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Insights(InsightServiceError),
    Records(serde_json::Error),
    Render(serde_json::Error),
    Export(csv::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Insights(err) => write!(f, "insight error: {}", err),
            AppError::Records(err) => write!(f, "record snapshot error: {}", err),
            AppError::Render(err) => write!(f, "result rendering error: {}", err),
            AppError::Export(err) => write!(f, "dataset export error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Insights(err) => Some(err),
            AppError::Records(err) | AppError::Render(err) => Some(err),
            AppError::Export(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Insights(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Records(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Insights(_)
            | AppError::Render(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<InsightServiceError> for AppError {
    fn from(value: InsightServiceError) -> Self {
        Self::Insights(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{").unwrap_err()
    }

    #[test]
    fn rendering_failures_are_not_reported_as_snapshot_errors() {
        let render = AppError::Render(json_error());
        let snapshot = AppError::Records(json_error());

        assert!(render.to_string().starts_with("result rendering error"));
        assert!(snapshot.to_string().starts_with("record snapshot error"));
        assert_eq!(
            render.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(snapshot.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
