use super::{PredictionMethod, ScoreMeta, Scored, Scorer, ScoringError};
use crate::insights::features::math::round2;
use crate::insights::features::{EmployeeFeatures, FeatureColumns, GoalFeatures};
use crate::insights::model::{InferenceError, TrainedModelArtifact};

/// Scores with a loaded artifact, reading inputs in the artifact's column order.
pub struct ModelScorer<'a> {
    artifact: &'a TrainedModelArtifact,
}

impl<'a> ModelScorer<'a> {
    pub fn new(artifact: &'a TrainedModelArtifact) -> Self {
        Self { artifact }
    }

    fn inputs(&self, features: &dyn FeatureColumns) -> Result<Vec<f64>, InferenceError> {
        self.artifact
            .feature_columns
            .iter()
            .map(|name| {
                features
                    .column(name)
                    .ok_or_else(|| InferenceError::UnknownFeature(name.clone()))
            })
            .collect()
    }

    /// Probability output first; a model that cannot produce one is retried with its raw
    /// prediction. Both are scaled by 100 and clamped to the score range.
    fn score(&self, features: &dyn FeatureColumns) -> Result<Scored, ScoringError> {
        let inputs = self.inputs(features)?;
        let model = &self.artifact.model;

        let (raw, method) = match model.predict_proba(&inputs) {
            Ok(probability) => (probability, PredictionMethod::Probability),
            Err(proba_err) => match model.predict(&inputs) {
                Ok(prediction) => {
                    tracing::debug!(
                        subject = features.subject_id(),
                        error = %proba_err,
                        "probability output unavailable, using raw prediction"
                    );
                    (prediction, PredictionMethod::RawPrediction)
                }
                Err(err) => return Err(ScoringError::ModelInference(err)),
            },
        };

        Ok(Scored {
            value: round2((raw * 100.0).clamp(0.0, 100.0)),
            meta: ScoreMeta::from_artifact(self.artifact, method),
        })
    }
}

impl Scorer for ModelScorer<'_> {
    fn score_employee(&self, features: &EmployeeFeatures) -> Result<Scored, ScoringError> {
        self.score(features)
    }

    fn score_goal(&self, features: &GoalFeatures) -> Result<Scored, ScoringError> {
        self.score(features)
    }
}
