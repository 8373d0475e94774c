use super::{ScoreMeta, Scored, Scorer, ScoringError};
use crate::insights::features::math::round2;
use crate::insights::features::{EmployeeFeatures, GoalFeatures};

/// Stand-in feedback rating (1-5 scale) when nobody has rated the employee.
pub const NEUTRAL_FEEDBACK_RATING: f64 = 3.0;
/// Stand-in completion rate when the employee owns no goals.
pub const NEUTRAL_COMPLETION_RATE: f64 = 0.5;

/// Deterministic scorer used when no trained artifact is available. Never fails.
pub struct FormulaScorer;

impl Scorer for FormulaScorer {
    fn score_employee(&self, features: &EmployeeFeatures) -> Result<Scored, ScoringError> {
        Ok(Scored {
            value: fallback_employee_score(features),
            meta: ScoreMeta::fallback(),
        })
    }

    fn score_goal(&self, features: &GoalFeatures) -> Result<Scored, ScoringError> {
        Ok(Scored {
            value: fallback_goal_probability(features),
            meta: ScoreMeta::fallback(),
        })
    }
}

/// `feedback * 20 * 0.5 + completion * 50`, rounded to two decimals.
///
/// Lies in `[0, 100]` whenever the feedback rating is within 1-5 and the completion rate within
/// `[0, 1]`; no clamping is applied.
pub fn fallback_employee_score(features: &EmployeeFeatures) -> f64 {
    let feedback = features
        .avg_feedback_rating
        .unwrap_or(NEUTRAL_FEEDBACK_RATING);
    let completion = if features.num_goals == 0 {
        NEUTRAL_COMPLETION_RATE
    } else {
        features.goal_completion_rate
    };

    round2(feedback * 20.0 * 0.5 + completion * 50.0)
}

/// `progress * 100 * 0.6 + (100 - min(days_left, 100)) * 0.4`, clamped to `[0, 100]`.
pub fn fallback_goal_probability(features: &GoalFeatures) -> f64 {
    let progress = if features.progress_ratio.is_finite() {
        features.progress_ratio
    } else {
        0.0
    };
    let days_left = features.days_left.clamp(0, 100) as f64;

    let raw = progress * 100.0 * 0.6 + (100.0 - days_left) * 0.4;
    round2(raw.clamp(0.0, 100.0))
}
