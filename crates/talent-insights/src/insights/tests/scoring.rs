use super::common::*;

use crate::insights::features::GOAL_COLUMNS;
use crate::insights::model::{ArtifactKey, InferenceError, LinearRegressor, ModelKind};
use crate::insights::scoring::{
    fallback_employee_score, fallback_goal_probability, score_employee, score_goal,
    select_scorer, FormulaScorer, ModelScorer, PredictionMethod, Scorer, ScoringError,
    ScoringPath,
};
use crate::insights::trainer::TRAINING_COLUMNS;

#[test]
fn struggling_employee_fallback_score() {
    let scored = FormulaScorer
        .score_employee(&struggling_features())
        .expect("formula never fails");

    assert_close(scored.value, 37.5);
    assert_eq!(scored.meta.path, ScoringPath::Fallback);
    assert!(scored.meta.model_kind.is_none());
}

#[test]
fn missing_feedback_uses_neutral_rating() {
    let scored = score_employee(&steady_features(), None).expect("formula never fails");

    assert_close(scored.value, 75.0);
}

#[test]
fn employee_without_goals_uses_neutral_completion_rate() {
    let mut features = steady_features();
    features.num_goals = 0;
    features.goal_completion_rate = 0.0;
    features.avg_feedback_rating = Some(4.0);

    assert_close(fallback_employee_score(&features), 65.0);
}

#[test]
fn fallback_employee_score_stays_in_range_for_normal_inputs() {
    for rating_step in 0..=8 {
        for ratio_step in 0..=10 {
            let mut features = struggling_features();
            features.avg_feedback_rating = Some(1.0 + rating_step as f64 * 0.5);
            features.goal_completion_rate = ratio_step as f64 / 10.0;

            let score = fallback_employee_score(&features);
            assert!((0.0..=100.0).contains(&score), "score {score} out of range");
        }
    }
}

#[test]
fn halfway_goal_fallback_probability() {
    let scored = FormulaScorer
        .score_goal(&halfway_features())
        .expect("formula never fails");

    assert_close(scored.value, 66.0);
    assert_eq!(scored.meta.path, ScoringPath::Fallback);
}

#[test]
fn fallback_goal_probability_clamps_extreme_inputs() {
    let mut features = halfway_features();
    features.days_left = 1_000_000;
    features.progress_ratio = 5.0;
    assert_close(fallback_goal_probability(&features), 100.0);

    features.progress_ratio = -3.0;
    assert_close(fallback_goal_probability(&features), 0.0);

    features.progress_ratio = f64::NAN;
    features.days_left = 0;
    assert_close(fallback_goal_probability(&features), 40.0);
}

#[test]
fn scores_round_to_two_decimals() {
    let mut features = struggling_features();
    features.avg_feedback_rating = Some(3.3333);

    assert_close(fallback_employee_score(&features), 45.83);
}

#[test]
fn scoring_twice_gives_identical_results() {
    let artifact = coin_flip_artifact(ArtifactKey::GoalCompletion, &GOAL_COLUMNS);

    let first = score_goal(&halfway_features(), Some(&artifact)).expect("score");
    let second = score_goal(&halfway_features(), Some(&artifact)).expect("score");
    assert_eq!(first, second);

    let first = score_employee(&struggling_features(), None).expect("score");
    let second = score_employee(&struggling_features(), None).expect("score");
    assert_eq!(first, second);
}

#[test]
fn classifier_artifact_scores_by_probability() {
    let artifact = coin_flip_artifact(ArtifactKey::EmployeePerformance, &TRAINING_COLUMNS);

    let scored = ModelScorer::new(&artifact)
        .score_employee(&struggling_features())
        .expect("score");

    assert_close(scored.value, 50.0);
    assert_eq!(scored.meta.path, ScoringPath::Model);
    assert_eq!(scored.meta.method, Some(PredictionMethod::Probability));
    assert_eq!(scored.meta.model_kind.as_deref(), Some("logistic_classifier"));
    assert_eq!(scored.meta.feature_columns.len(), TRAINING_COLUMNS.len());
    assert_eq!(scored.meta.trained_at, Some(artifact.trained_at));
}

#[test]
fn regressor_artifact_falls_back_to_raw_prediction() {
    let mut artifact = coin_flip_artifact(ArtifactKey::GoalCompletion, &GOAL_COLUMNS);
    artifact.model = ModelKind::LinearRegressor(LinearRegressor {
        weights: vec![0.0, 0.0, 0.0],
        intercept: 0.42,
    });

    let scored = select_scorer(Some(&artifact))
        .score_goal(&halfway_features())
        .expect("score");

    assert_close(scored.value, 42.0);
    assert_eq!(scored.meta.method, Some(PredictionMethod::RawPrediction));
}

#[test]
fn model_scores_are_clamped_to_score_range() {
    let columns = ["num_goals", "goal_completion_rate", "engagement_score"];
    let mut artifact = coin_flip_artifact(ArtifactKey::EmployeePerformance, &columns);
    artifact.model = ModelKind::LinearRegressor(LinearRegressor {
        weights: vec![0.0; columns.len()],
        intercept: 3.0,
    });

    let scored = score_employee(&steady_features(), Some(&artifact)).expect("score");

    assert_close(scored.value, 100.0);
}

#[test]
fn unknown_artifact_column_is_an_inference_failure() {
    let artifact = coin_flip_artifact(ArtifactKey::EmployeePerformance, &["tenure_years"]);

    let err = score_employee(&steady_features(), Some(&artifact)).expect_err("unknown column");

    match err {
        ScoringError::ModelInference(InferenceError::UnknownFeature(name)) => {
            assert_eq!(name, "tenure_years")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn width_mismatch_fails_both_prediction_methods() {
    let mut artifact = coin_flip_artifact(ArtifactKey::GoalCompletion, &GOAL_COLUMNS);
    if let ModelKind::LogisticClassifier(model) = &mut artifact.model {
        model.weights.push(0.0);
        model.means.push(0.0);
        model.scales.push(1.0);
    }

    let err = score_goal(&halfway_features(), Some(&artifact)).expect_err("width mismatch");

    assert!(matches!(
        err,
        ScoringError::ModelInference(InferenceError::FeatureCountMismatch {
            expected: 4,
            actual: 3
        })
    ));
}
