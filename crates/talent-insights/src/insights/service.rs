use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::artifacts::ModelArtifactStore;
use super::domain::SubjectKind;
use super::features::{EmployeeFeatures, ExtractionError, FeatureExtractor, GoalFeatures};
use super::model::{ArtifactKey, TrainedModelArtifact};
use super::recommend::recommend;
use super::scoring::{select_scorer, ScoreMeta, ScoringError};
use super::store::{HrRecordStore, StoreError};
use super::trainer::{TrainOutcome, Trainer, TrainingError, TrainingRow};

/// Employee score returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeScoreResult {
    pub employee_id: String,
    pub predicted_performance: f64,
    pub features: EmployeeFeatures,
    pub recommendations: Vec<String>,
    pub meta: ScoreMeta,
}

/// Goal-completion probability returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalScoreResult {
    pub goal_id: String,
    pub probability: f64,
    pub features: GoalFeatures,
    pub meta: ScoreMeta,
}

/// Service composing feature extraction, scoring, recommendations, and training.
pub struct InsightService<S, M> {
    extractor: FeatureExtractor<S>,
    store: Arc<S>,
    models: Arc<M>,
    trainer: Trainer,
}

impl<S, M> InsightService<S, M>
where
    S: HrRecordStore + 'static,
    M: ModelArtifactStore + 'static,
{
    pub fn new(store: Arc<S>, models: Arc<M>) -> Self {
        Self {
            extractor: FeatureExtractor::new(Arc::clone(&store)),
            store,
            models,
            trainer: Trainer::default(),
        }
    }

    pub fn score_employee(&self, raw_id: &str) -> Result<EmployeeScoreResult, InsightServiceError> {
        self.score_employee_at(raw_id, Utc::now())
    }

    /// Scores an employee as of `now`. Identical inputs and artifacts give identical results.
    pub fn score_employee_at(
        &self,
        raw_id: &str,
        now: DateTime<Utc>,
    ) -> Result<EmployeeScoreResult, InsightServiceError> {
        let features = self.extractor.extract_employee_features(raw_id, now)?;
        let artifact = self.load_artifact(ArtifactKey::EmployeePerformance);
        let scored = select_scorer(artifact.as_ref()).score_employee(&features)?;

        info!(
            employee_id = %features.employee_id,
            path = ?scored.meta.path,
            score = scored.value,
            "employee scored"
        );

        Ok(EmployeeScoreResult {
            employee_id: features.employee_id.clone(),
            predicted_performance: scored.value,
            recommendations: recommend(&features),
            features,
            meta: scored.meta,
        })
    }

    pub fn score_goal(&self, raw_id: &str) -> Result<GoalScoreResult, InsightServiceError> {
        self.score_goal_at(raw_id, Utc::now())
    }

    pub fn score_goal_at(
        &self,
        raw_id: &str,
        now: DateTime<Utc>,
    ) -> Result<GoalScoreResult, InsightServiceError> {
        let features = self.extractor.extract_goal_features(raw_id, now)?;
        let artifact = self.load_artifact(ArtifactKey::GoalCompletion);
        let scored = select_scorer(artifact.as_ref()).score_goal(&features)?;

        info!(
            goal_id = %features.goal_id,
            path = ?scored.meta.path,
            probability = scored.value,
            "goal scored"
        );

        Ok(GoalScoreResult {
            goal_id: features.goal_id.clone(),
            probability: scored.value,
            features,
            meta: scored.meta,
        })
    }

    pub fn retrain(&self) -> Result<TrainOutcome, InsightServiceError> {
        self.retrain_at(Utc::now())
    }

    pub fn retrain_at(&self, now: DateTime<Utc>) -> Result<TrainOutcome, InsightServiceError> {
        Ok(self
            .trainer
            .train(self.store.as_ref(), self.models.as_ref(), now)?)
    }

    /// The labelled dataset the next training run would see.
    pub fn training_dataset(&self) -> Result<Vec<TrainingRow>, InsightServiceError> {
        Ok(self.trainer.employee_dataset(self.store.as_ref())?)
    }

    /// A missing artifact and an unreadable one both lead to the fallback formula; only the
    /// latter is logged.
    fn load_artifact(&self, key: ArtifactKey) -> Option<TrainedModelArtifact> {
        match self.models.load(key) {
            Ok(artifact) => artifact,
            Err(err) => {
                warn!(
                    key = key.label(),
                    error = %err,
                    "model artifact unavailable, using fallback formula"
                );
                None
            }
        }
    }
}

/// Error raised by the insight service.
#[derive(Debug, thiserror::Error)]
pub enum InsightServiceError {
    #[error("{} '{id}' not found", .kind.label())]
    NotFound { kind: SubjectKind, id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Training(#[from] TrainingError),
}

impl InsightServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            InsightServiceError::NotFound { .. } | InsightServiceError::Store(StoreError::NotFound)
        )
    }
}

impl From<ExtractionError> for InsightServiceError {
    fn from(value: ExtractionError) -> Self {
        match value {
            ExtractionError::NotFound { kind, id } => Self::NotFound { kind, id },
            ExtractionError::Store(err) => Self::Store(err),
        }
    }
}
