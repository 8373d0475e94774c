//! Reduces a subject's related goals, reviews, and feedback into a fixed-shape feature record.

pub mod math;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{EmployeeKey, EmployeeRecord, GoalRecord, ReviewRecord, SubjectKind};
use super::lookup::{resolve_employee, resolve_goal};
use super::store::{HrRecordStore, StoreError};
use math::{mean_of, safe_ratio, whole_days_between};

/// Days-since-review reported when the employee has never been reviewed.
pub const NO_REVIEW_SENTINEL_DAYS: i64 = 9999;

/// Column order the goal classifier is trained and scored on.
pub const GOAL_COLUMNS: [&str; 3] = ["progress_ratio", "days_left", "num_assignees"];

/// Named numeric access used to assemble model input vectors in artifact column order.
pub trait FeatureColumns {
    fn subject_id(&self) -> &str;

    /// Value for a named column, `None` when the name is not a known column.
    fn column(&self, name: &str) -> Option<f64>;
}

/// Counts taken from an employee's most recent review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSignals {
    pub num_strengths: usize,
    pub num_improvements: usize,
    pub num_achievements: usize,
    pub goals_achieved: usize,
    pub goals_missed: usize,
    pub feedback_count: usize,
}

impl ReviewSignals {
    pub fn from_review(review: &ReviewRecord) -> Self {
        Self {
            num_strengths: review.strengths.len(),
            num_improvements: review.areas_for_improvement.len(),
            num_achievements: review.achievements.len(),
            goals_achieved: review.goals_achieved.len(),
            goals_missed: review.goals_missed.len(),
            feedback_count: review.feedback_collected.len(),
        }
    }
}

/// Immutable snapshot of one employee's derived features at one evaluation instant.
///
/// Optional fields stay `None` when there is no underlying data; neutral defaults are only
/// substituted at the point a formula or model consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeFeatures {
    pub employee_id: String,
    pub num_goals: usize,
    /// Completed over total owned goals, `0.0` when the employee owns none.
    pub goal_completion_rate: f64,
    pub avg_review_score: Option<f64>,
    pub avg_feedback_rating: Option<f64>,
    pub avg_sentiment: Option<f64>,
    pub avg_goal_progress: Option<f64>,
    /// [`NO_REVIEW_SENTINEL_DAYS`] when no review exists.
    pub days_since_review: i64,
    pub engagement_score: Option<f64>,
    pub latest_review: Option<ReviewSignals>,
}

impl FeatureColumns for EmployeeFeatures {
    fn subject_id(&self) -> &str {
        &self.employee_id
    }

    fn column(&self, name: &str) -> Option<f64> {
        let review = self.latest_review;
        let count = |pick: fn(&ReviewSignals) -> usize| {
            review.map(|signals| pick(&signals) as f64).unwrap_or(0.0)
        };

        let value = match name {
            "num_goals" => self.num_goals as f64,
            "goal_completion_rate" => self.goal_completion_rate,
            "avg_review_score" => self.avg_review_score.unwrap_or(0.0),
            "avg_feedback_rating" => self.avg_feedback_rating.unwrap_or(0.0),
            "avg_sentiment" => self.avg_sentiment.unwrap_or(0.0),
            "avg_goal_progress" => self.avg_goal_progress.unwrap_or(0.0),
            "days_since_review" => self.days_since_review as f64,
            "engagement_score" => self.engagement_score.unwrap_or(0.0),
            "num_strengths" => count(|r| r.num_strengths),
            "num_improvements" => count(|r| r.num_improvements),
            "num_achievements" => count(|r| r.num_achievements),
            "goals_achieved" => count(|r| r.goals_achieved),
            "goals_missed" => count(|r| r.goals_missed),
            "feedback_count" => count(|r| r.feedback_count),
            _ => return None,
        };
        Some(value)
    }
}

/// Features for goal-completion scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalFeatures {
    pub goal_id: String,
    /// Stored percentage divided by 100. Values outside `[0, 1]` are kept as reported.
    pub progress_ratio: f64,
    /// Whole days until the due date, floored at zero.
    pub days_left: i64,
    pub num_assignees: usize,
}

impl GoalFeatures {
    pub fn from_goal(goal: &GoalRecord, now: DateTime<Utc>) -> Self {
        let days_left = goal
            .due_date
            .map(|due| whole_days_between(now, due))
            .unwrap_or(0);

        Self {
            goal_id: goal.goal_id.clone(),
            progress_ratio: goal.progress_percentage / 100.0,
            days_left,
            num_assignees: goal.assignees.len(),
        }
    }
}

impl FeatureColumns for GoalFeatures {
    fn subject_id(&self) -> &str {
        &self.goal_id
    }

    fn column(&self, name: &str) -> Option<f64> {
        match name {
            "progress_ratio" => Some(self.progress_ratio),
            "days_left" => Some(self.days_left as f64),
            "num_assignees" => Some(self.num_assignees as f64),
            _ => None,
        }
    }
}

/// Failure to produce a feature record.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("{} '{id}' not found", .kind.label())]
    NotFound { kind: SubjectKind, id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read-only feature extraction over a collaborator store.
pub struct FeatureExtractor<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for FeatureExtractor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> FeatureExtractor<S>
where
    S: HrRecordStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn extract_employee_features(
        &self,
        raw_id: &str,
        now: DateTime<Utc>,
    ) -> Result<EmployeeFeatures, ExtractionError> {
        let employee = resolve_employee(self.store.as_ref(), raw_id)?.ok_or_else(|| {
            ExtractionError::NotFound {
                kind: SubjectKind::Employee,
                id: raw_id.to_string(),
            }
        })?;
        Ok(self.employee_features(&employee, now)?)
    }

    pub fn extract_goal_features(
        &self,
        raw_id: &str,
        now: DateTime<Utc>,
    ) -> Result<GoalFeatures, ExtractionError> {
        let goal = resolve_goal(self.store.as_ref(), raw_id)?.ok_or_else(|| {
            ExtractionError::NotFound {
                kind: SubjectKind::Goal,
                id: raw_id.to_string(),
            }
        })?;
        Ok(GoalFeatures::from_goal(&goal, now))
    }

    /// Features for an already resolved employee.
    pub fn employee_features(
        &self,
        employee: &EmployeeRecord,
        now: DateTime<Utc>,
    ) -> Result<EmployeeFeatures, StoreError> {
        let key: &EmployeeKey = &employee.id;
        let goals = self.store.goals_owned_by(key)?;
        let reviews = self.store.reviews_for(key)?;
        let feedback = self.store.feedback_for(key)?;

        let num_goals = goals.len();
        let completed = goals.iter().filter(|goal| goal.status.is_completed()).count();
        let goal_completion_rate = safe_ratio(completed as f64, num_goals as f64);

        let latest = reviews.iter().max_by_key(|review| review.created_at);
        let days_since_review = latest
            .map(|review| whole_days_between(review.created_at, now))
            .unwrap_or(NO_REVIEW_SENTINEL_DAYS);

        Ok(EmployeeFeatures {
            employee_id: employee.id.0.clone(),
            num_goals,
            goal_completion_rate,
            avg_review_score: mean_of(reviews.iter().map(|review| review.overall_rating)),
            avg_feedback_rating: mean_of(feedback.iter().filter_map(|entry| entry.rating)),
            avg_sentiment: mean_of(feedback.iter().filter_map(|entry| entry.sentiment_score)),
            avg_goal_progress: mean_of(goals.iter().map(|goal| goal.progress_percentage)),
            days_since_review,
            engagement_score: employee.engagement_score,
            latest_review: latest.map(ReviewSignals::from_review),
        })
    }
}
