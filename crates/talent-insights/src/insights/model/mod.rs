//! Fitted predictive models and the artifact envelope they are persisted in.

mod linear;
mod logistic;
pub mod metrics;

pub use linear::LinearRegressor;
pub use logistic::{LogisticClassifier, LogisticFitConfig};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed storage keys; each key holds exactly one artifact at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKey {
    EmployeePerformance,
    GoalCompletion,
}

impl ArtifactKey {
    pub const ALL: [ArtifactKey; 2] = [
        ArtifactKey::EmployeePerformance,
        ArtifactKey::GoalCompletion,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKey::EmployeePerformance => "performance_predictor.json",
            ArtifactKey::GoalCompletion => "goal_classifier.json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArtifactKey::EmployeePerformance => "employee_performance",
            ArtifactKey::GoalCompletion => "goal_completion",
        }
    }
}

/// Held-out evaluation metrics recorded at training time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// `None` when the held-out split did not contain both classes.
    pub roc_auc: Option<f64>,
    /// `None` when there was no held-out split.
    pub rmse: Option<f64>,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// The fitted model itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKind {
    LogisticClassifier(LogisticClassifier),
    LinearRegressor(LinearRegressor),
}

impl ModelKind {
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::LogisticClassifier(_) => "logistic_classifier",
            ModelKind::LinearRegressor(_) => "linear_regressor",
        }
    }

    /// Probability of the positive class in `[0, 1]`.
    pub fn predict_proba(&self, inputs: &[f64]) -> Result<f64, InferenceError> {
        match self {
            ModelKind::LogisticClassifier(model) => finite(model.predict_proba(inputs)?),
            ModelKind::LinearRegressor(_) => Err(InferenceError::ProbabilityUnsupported),
        }
    }

    /// Raw numeric prediction: the hard class label for classifiers, the raw output otherwise.
    pub fn predict(&self, inputs: &[f64]) -> Result<f64, InferenceError> {
        match self {
            ModelKind::LogisticClassifier(model) => {
                let probability = finite(model.predict_proba(inputs)?)?;
                Ok(if probability >= 0.5 { 1.0 } else { 0.0 })
            }
            ModelKind::LinearRegressor(model) => finite(model.predict(inputs)?),
        }
    }
}

fn finite(value: f64) -> Result<f64, InferenceError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InferenceError::NonFiniteOutput)
    }
}

/// Fitted model plus the metadata needed to score with it. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModelArtifact {
    pub key: ArtifactKey,
    pub model: ModelKind,
    pub metrics: ModelMetrics,
    /// Input order the model was fit on.
    pub feature_columns: Vec<String>,
    pub trained_at: DateTime<Utc>,
    pub sample_count: usize,
}

/// Failure raised while running a model over an input vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("model expects {expected} features, received {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[error("model references unknown feature column '{0}'")]
    UnknownFeature(String),
    #[error("model produced a non-finite output")]
    NonFiniteOutput,
    #[error("model does not expose class probabilities")]
    ProbabilityUnsupported,
}

pub(crate) fn check_width(expected: usize, inputs: &[f64]) -> Result<(), InferenceError> {
    if expected == inputs.len() {
        Ok(())
    } else {
        Err(InferenceError::FeatureCountMismatch {
            expected,
            actual: inputs.len(),
        })
    }
}
