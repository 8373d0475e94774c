//! Rule-based coaching hints attached to employee scores.

use super::features::EmployeeFeatures;

/// A single threshold rule. Rules are evaluated in table order and every match contributes.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationRule {
    pub name: &'static str,
    pub applies: fn(&EmployeeFeatures) -> bool,
    pub message: &'static str,
}

pub const GOAL_COMPLETION_THRESHOLD: f64 = 0.5;
pub const FEEDBACK_RATING_THRESHOLD: f64 = 3.0;
pub const ENGAGEMENT_THRESHOLD: f64 = 40.0;

pub const RULES: [RecommendationRule; 3] = [
    RecommendationRule {
        name: "low_goal_completion",
        applies: low_goal_completion,
        message: "Focus on finishing active goals: break them into smaller milestones and clear blockers.",
    },
    RecommendationRule {
        name: "low_peer_feedback",
        applies: low_peer_feedback,
        message: "Peer feedback suggests issues; schedule a 1:1 with the manager to identify improvements.",
    },
    RecommendationRule {
        name: "low_engagement",
        applies: low_engagement,
        message: "Engagement is low; consider pairing with a mentor and setting short-term wins.",
    },
];

fn low_goal_completion(features: &EmployeeFeatures) -> bool {
    features.goal_completion_rate < GOAL_COMPLETION_THRESHOLD
}

/// Only rated feedback counts; an employee nobody rated is not flagged.
fn low_peer_feedback(features: &EmployeeFeatures) -> bool {
    features
        .avg_feedback_rating
        .is_some_and(|rating| rating < FEEDBACK_RATING_THRESHOLD)
}

fn low_engagement(features: &EmployeeFeatures) -> bool {
    features
        .engagement_score
        .is_some_and(|score| score < ENGAGEMENT_THRESHOLD)
}

/// Emitted alone when no rule fires.
pub const STEADY_PERFORMANCE: &str =
    "Solid performance. Consider stretch goals or leadership opportunities.";

/// Messages of every matching rule in table order, or [`STEADY_PERFORMANCE`] when none match.
/// Never empty.
pub fn recommend(features: &EmployeeFeatures) -> Vec<String> {
    let mut messages: Vec<String> = RULES
        .iter()
        .filter(|rule| (rule.applies)(features))
        .map(|rule| rule.message.to_string())
        .collect();

    if messages.is_empty() {
        messages.push(STEADY_PERFORMANCE.to_string());
    }
    messages
}
