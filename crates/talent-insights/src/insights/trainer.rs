//! Offline training of the employee and goal classifiers from the full HR corpus.

use std::collections::HashMap;
use std::io;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::artifacts::{ArtifactStoreError, ModelArtifactStore};
use super::domain::{FeedbackRecord, GoalRecord, ReviewRecord};
use super::features::math::mean_of;
use super::features::{GoalFeatures, ReviewSignals, GOAL_COLUMNS};
use super::model::metrics::{rmse, roc_auc};
use super::model::{
    ArtifactKey, LogisticClassifier, LogisticFitConfig, ModelKind, ModelMetrics,
    TrainedModelArtifact,
};
use super::store::{HrRecordStore, StoreError};

/// Input columns of the employee classifier, in fit order.
pub const TRAINING_COLUMNS: [&str; 9] = [
    "num_strengths",
    "num_improvements",
    "num_achievements",
    "goals_achieved",
    "goals_missed",
    "feedback_count",
    "avg_feedback_rating",
    "avg_sentiment",
    "avg_goal_progress",
];

/// Reviews rated at or above this are labelled high performers.
pub const HIGH_PERFORMER_RATING: f64 = 4.0;

/// Every `HOLDOUT_STRIDE`-th row (the last of each group) is held out for evaluation.
const HOLDOUT_STRIDE: usize = 5;

/// One labelled row per review. Employee aggregates without data are recorded as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingRow {
    pub review_id: String,
    pub employee_id: String,
    pub overall_rating: f64,
    pub num_strengths: usize,
    pub num_improvements: usize,
    pub num_achievements: usize,
    pub goals_achieved: usize,
    pub goals_missed: usize,
    pub feedback_count: usize,
    pub avg_feedback_rating: f64,
    pub avg_sentiment: f64,
    pub avg_goal_progress: f64,
    pub high_performer: bool,
}

impl TrainingRow {
    /// Values in [`TRAINING_COLUMNS`] order.
    pub fn inputs(&self) -> Vec<f64> {
        vec![
            self.num_strengths as f64,
            self.num_improvements as f64,
            self.num_achievements as f64,
            self.goals_achieved as f64,
            self.goals_missed as f64,
            self.feedback_count as f64,
            self.avg_feedback_rating,
            self.avg_sentiment,
            self.avg_goal_progress,
        ]
    }

    pub fn label(&self) -> f64 {
        if self.high_performer {
            1.0
        } else {
            0.0
        }
    }
}

#[derive(Default)]
struct EmployeeAggregates {
    ratings: Vec<f64>,
    sentiments: Vec<f64>,
    goal_progress: Vec<f64>,
}

/// Builds the labelled employee dataset in review order.
pub fn build_training_rows(
    reviews: &[ReviewRecord],
    goals: &[GoalRecord],
    feedback: &[FeedbackRecord],
) -> Vec<TrainingRow> {
    let mut aggregates: HashMap<&str, EmployeeAggregates> = HashMap::new();
    for entry in feedback {
        let slot = aggregates.entry(entry.receiver_id.as_str()).or_default();
        slot.ratings.extend(entry.rating);
        slot.sentiments.extend(entry.sentiment_score);
    }
    for goal in goals {
        if let Some(owner) = goal.owner_employee_id.as_deref() {
            aggregates
                .entry(owner)
                .or_default()
                .goal_progress
                .push(goal.progress_percentage);
        }
    }

    let empty = EmployeeAggregates::default();
    reviews
        .iter()
        .map(|review| {
            let signals = ReviewSignals::from_review(review);
            let employee = aggregates
                .get(review.employee_id.as_str())
                .unwrap_or(&empty);
            let mean = |values: &[f64]| mean_of(values.iter().copied()).unwrap_or(0.0);

            TrainingRow {
                review_id: review.review_id.clone(),
                employee_id: review.employee_id.clone(),
                overall_rating: review.overall_rating,
                num_strengths: signals.num_strengths,
                num_improvements: signals.num_improvements,
                num_achievements: signals.num_achievements,
                goals_achieved: signals.goals_achieved,
                goals_missed: signals.goals_missed,
                feedback_count: signals.feedback_count,
                avg_feedback_rating: mean(&employee.ratings),
                avg_sentiment: mean(&employee.sentiments),
                avg_goal_progress: mean(&employee.goal_progress),
                high_performer: review.overall_rating >= HIGH_PERFORMER_RATING,
            }
        })
        .collect()
}

/// Goal features paired with the outcome of every closed goal.
///
/// Days left are measured from the completion date when one was recorded, so the row reflects the
/// goal as it stood when it closed.
pub fn build_goal_rows(goals: &[GoalRecord], now: DateTime<Utc>) -> Vec<(GoalFeatures, bool)> {
    goals
        .iter()
        .filter(|goal| goal.status.is_closed())
        .map(|goal| {
            let reference = goal.completed_date.unwrap_or(now);
            (
                GoalFeatures::from_goal(goal, reference),
                goal.status.is_completed(),
            )
        })
        .collect()
}

/// Writes the employee dataset as CSV with a header row.
pub fn write_dataset_csv<W: io::Write>(rows: &[TrainingRow], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainOutcome {
    Trained(TrainingSummary),
    /// The review corpus was empty; existing artifacts are left untouched.
    NoTrainingData,
}

/// Every artifact persisted by one training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub trained_at: DateTime<Utc>,
    pub artifacts: Vec<TrainedArtifactSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainedArtifactSummary {
    pub key: ArtifactKey,
    pub metrics: ModelMetrics,
    pub sample_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Artifacts(#[from] ArtifactStoreError),
}

/// Batch trainer. Callers are expected to serialize runs; two concurrent runs race on the same
/// artifact keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trainer {
    fit: LogisticFitConfig,
}

impl Trainer {
    /// The labelled employee dataset as it would be trained on right now.
    pub fn employee_dataset<S>(&self, store: &S) -> Result<Vec<TrainingRow>, StoreError>
    where
        S: HrRecordStore + ?Sized,
    {
        let reviews = store.all_reviews()?;
        let goals = store.all_goals()?;
        let feedback = store.all_feedback()?;
        Ok(build_training_rows(&reviews, &goals, &feedback))
    }

    /// Fits both classifiers and replaces their persisted artifacts.
    ///
    /// The goal classifier is only refreshed when closed goals exist.
    pub fn train<S, M>(
        &self,
        store: &S,
        models: &M,
        now: DateTime<Utc>,
    ) -> Result<TrainOutcome, TrainingError>
    where
        S: HrRecordStore + ?Sized,
        M: ModelArtifactStore + ?Sized,
    {
        let reviews = store.all_reviews()?;
        if reviews.is_empty() {
            info!("no reviews available, skipping training");
            return Ok(TrainOutcome::NoTrainingData);
        }
        let goals = store.all_goals()?;
        let feedback = store.all_feedback()?;

        let rows = build_training_rows(&reviews, &goals, &feedback);
        let employee = self.fit_artifact(
            ArtifactKey::EmployeePerformance,
            &TRAINING_COLUMNS,
            rows.iter().map(TrainingRow::inputs).collect(),
            rows.iter().map(TrainingRow::label).collect(),
            now,
        );

        let goal_rows = build_goal_rows(&goals, now);
        let goal = (!goal_rows.is_empty()).then(|| {
            self.fit_artifact(
                ArtifactKey::GoalCompletion,
                &GOAL_COLUMNS,
                goal_rows
                    .iter()
                    .map(|(features, _)| {
                        vec![
                            features.progress_ratio,
                            features.days_left as f64,
                            features.num_assignees as f64,
                        ]
                    })
                    .collect(),
                goal_rows
                    .iter()
                    .map(|(_, completed)| if *completed { 1.0 } else { 0.0 })
                    .collect(),
                now,
            )
        });

        let mut artifacts = Vec::new();
        for artifact in std::iter::once(employee).chain(goal) {
            models.save(&artifact)?;
            info!(
                key = artifact.key.label(),
                samples = artifact.sample_count,
                roc_auc = ?artifact.metrics.roc_auc,
                rmse = ?artifact.metrics.rmse,
                "model artifact trained"
            );
            artifacts.push(TrainedArtifactSummary {
                key: artifact.key,
                metrics: artifact.metrics,
                sample_count: artifact.sample_count,
            });
        }

        Ok(TrainOutcome::Trained(TrainingSummary {
            trained_at: now,
            artifacts,
        }))
    }

    fn fit_artifact(
        &self,
        key: ArtifactKey,
        columns: &[&str],
        inputs: Vec<Vec<f64>>,
        labels: Vec<f64>,
        now: DateTime<Utc>,
    ) -> TrainedModelArtifact {
        let split = HoldoutSplit::new(&inputs, &labels);
        let model = LogisticClassifier::fit(&split.train_inputs, &split.train_labels, self.fit);

        let probabilities: Vec<f64> = split
            .test_inputs
            .iter()
            .filter_map(|row| model.predict_proba(row).ok())
            .collect();
        let metrics = ModelMetrics {
            roc_auc: roc_auc(&split.test_labels, &probabilities),
            rmse: rmse(&split.test_labels, &probabilities),
            train_rows: split.train_labels.len(),
            test_rows: split.test_labels.len(),
        };

        TrainedModelArtifact {
            key,
            model: ModelKind::LogisticClassifier(model),
            metrics,
            feature_columns: columns.iter().map(|name| name.to_string()).collect(),
            trained_at: now,
            sample_count: labels.len(),
        }
    }
}

/// Deterministic 80/20 split. With no held-out rows, every row trains.
struct HoldoutSplit {
    train_inputs: Vec<Vec<f64>>,
    train_labels: Vec<f64>,
    test_inputs: Vec<Vec<f64>>,
    test_labels: Vec<f64>,
}

impl HoldoutSplit {
    fn new(inputs: &[Vec<f64>], labels: &[f64]) -> Self {
        let mut split = Self {
            train_inputs: Vec::new(),
            train_labels: Vec::new(),
            test_inputs: Vec::new(),
            test_labels: Vec::new(),
        };
        for (index, (row, label)) in inputs.iter().zip(labels).enumerate() {
            if index % HOLDOUT_STRIDE == HOLDOUT_STRIDE - 1 {
                split.test_inputs.push(row.clone());
                split.test_labels.push(*label);
            } else {
                split.train_inputs.push(row.clone());
                split.train_labels.push(*label);
            }
        }
        split
    }
}
