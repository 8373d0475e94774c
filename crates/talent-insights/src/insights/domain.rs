use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Primary key of an employee document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeKey(pub String);

/// Primary key of a goal document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GoalKey(pub String);

/// Employee fields the insight engine reads. Other HR attributes stay with the record owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: EmployeeKey,
    /// Business identifier, e.g. `EMP1A2B3C4D`.
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub department: Option<String>,
    /// Supplied by an external engagement survey; absent for most employees.
    #[serde(default)]
    pub engagement_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    NotStarted,
    InProgress,
    AtRisk,
    Completed,
    /// Legacy imports wrote `done` for finished goals.
    Done,
    Cancelled,
}

impl GoalStatus {
    pub fn is_completed(self) -> bool {
        matches!(self, GoalStatus::Completed | GoalStatus::Done)
    }

    /// Completed or cancelled goals carry a known outcome and can label training rows.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            GoalStatus::Completed | GoalStatus::Done | GoalStatus::Cancelled
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            GoalStatus::NotStarted => "not_started",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::AtRisk => "at_risk",
            GoalStatus::Completed => "completed",
            GoalStatus::Done => "done",
            GoalStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentRole {
    Owner,
    Contributor,
    Reviewer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalAssignee {
    pub assignee_id: String,
    pub role: AssignmentRole,
    #[serde(default)]
    pub allocation_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub id: GoalKey,
    /// Business identifier, e.g. `GOL9F8E7D6C`.
    pub goal_id: String,
    #[serde(default)]
    pub owner_employee_id: Option<String>,
    pub title: String,
    pub status: GoalStatus,
    /// Stored on a 0-100 scale.
    #[serde(default)]
    pub progress_percentage: f64,
    pub start_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignees: Vec<GoalAssignee>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: String,
    pub review_id: String,
    /// Primary key of the reviewed employee.
    pub employee_id: String,
    pub reviewer_id: String,
    /// 1-5 scale.
    pub overall_rating: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub goals_achieved: Vec<String>,
    #[serde(default)]
    pub goals_missed: Vec<String>,
    #[serde(default)]
    pub feedback_collected: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub feedback_id: String,
    /// Primary key of the employee the feedback is about.
    pub receiver_id: String,
    pub giver_id: String,
    /// 1-5 scale when present.
    #[serde(default)]
    pub rating: Option<f64>,
    /// -1 to 1 when present.
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// What kind of subject a request targeted, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Employee,
    Goal,
}

impl SubjectKind {
    pub fn label(self) -> &'static str {
        match self {
            SubjectKind::Employee => "employee",
            SubjectKind::Goal => "goal",
        }
    }
}
