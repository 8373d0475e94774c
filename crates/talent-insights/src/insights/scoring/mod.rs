//! Turns feature records into 0-100 scores, either through a trained artifact or the fallback
//! formula.

mod formula;
mod model;

pub use formula::{
    fallback_employee_score, fallback_goal_probability, FormulaScorer, NEUTRAL_COMPLETION_RATE,
    NEUTRAL_FEEDBACK_RATING,
};
pub use model::ModelScorer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::features::{EmployeeFeatures, GoalFeatures};
use super::model::{InferenceError, ModelMetrics, TrainedModelArtifact};

/// Which implementation produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPath {
    Model,
    Fallback,
}

/// How a model-backed score was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMethod {
    Probability,
    RawPrediction,
}

/// Provenance attached to every score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMeta {
    pub path: ScoringPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<PredictionMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ModelMetrics>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<DateTime<Utc>>,
}

impl ScoreMeta {
    pub fn fallback() -> Self {
        Self {
            path: ScoringPath::Fallback,
            method: None,
            model_kind: None,
            metrics: None,
            feature_columns: Vec::new(),
            trained_at: None,
        }
    }

    pub fn from_artifact(artifact: &TrainedModelArtifact, method: PredictionMethod) -> Self {
        Self {
            path: ScoringPath::Model,
            method: Some(method),
            model_kind: Some(artifact.model.label().to_string()),
            metrics: Some(artifact.metrics),
            feature_columns: artifact.feature_columns.clone(),
            trained_at: Some(artifact.trained_at),
        }
    }
}

/// A score on the 0-100 scale, rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub value: f64,
    pub meta: ScoreMeta,
}

/// Capability to score employees and goals. Implementations never mutate shared state.
pub trait Scorer: Send + Sync {
    fn score_employee(&self, features: &EmployeeFeatures) -> Result<Scored, ScoringError>;
    fn score_goal(&self, features: &GoalFeatures) -> Result<Scored, ScoringError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("model inference failed: {0}")]
    ModelInference(#[from] InferenceError),
}

/// Model-backed scoring when an artifact is available, the fallback formula otherwise.
pub fn select_scorer(artifact: Option<&TrainedModelArtifact>) -> Box<dyn Scorer + '_> {
    match artifact {
        Some(artifact) => Box::new(ModelScorer::new(artifact)),
        None => Box::new(FormulaScorer),
    }
}

/// Scores an employee with the supplied artifact, or the fallback formula when there is none.
pub fn score_employee(
    features: &EmployeeFeatures,
    artifact: Option<&TrainedModelArtifact>,
) -> Result<Scored, ScoringError> {
    select_scorer(artifact).score_employee(features)
}

/// Goal-completion probability with the supplied artifact, or the fallback formula.
pub fn score_goal(
    features: &GoalFeatures,
    artifact: Option<&TrainedModelArtifact>,
) -> Result<Scored, ScoringError> {
    select_scorer(artifact).score_goal(features)
}
