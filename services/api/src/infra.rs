use chrono::{DateTime, Duration, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock, RwLockReadGuard};
use talent_insights::config::InsightsConfig;
use talent_insights::error::AppError;
use talent_insights::insights::{
    AssignmentRole, EmployeeKey, EmployeeRecord, FeedbackRecord, FsModelStore, GoalAssignee,
    GoalKey, GoalRecord, GoalStatus, HrRecordStore, InsightService, ReviewRecord, StoreError,
};
use tracing::info;

pub(crate) type Insights = InsightService<InMemoryRecordStore, FsModelStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Serialized form of the HR collections the insight engine reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct HrSnapshot {
    #[serde(default)]
    pub(crate) employees: Vec<EmployeeRecord>,
    #[serde(default)]
    pub(crate) goals: Vec<GoalRecord>,
    #[serde(default)]
    pub(crate) reviews: Vec<ReviewRecord>,
    #[serde(default)]
    pub(crate) feedback: Vec<FeedbackRecord>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRecordStore {
    records: Arc<RwLock<HrSnapshot>>,
}

impl InMemoryRecordStore {
    pub(crate) fn from_snapshot(snapshot: HrSnapshot) -> Self {
        Self {
            records: Arc::new(RwLock::new(snapshot)),
        }
    }

    pub(crate) fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: HrSnapshot = serde_json::from_str(&raw).map_err(AppError::Records)?;
        info!(
            path = %path.display(),
            employees = snapshot.employees.len(),
            goals = snapshot.goals.len(),
            reviews = snapshot.reviews.len(),
            "loaded hr record snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HrSnapshot>, StoreError> {
        self.records
            .read()
            .map_err(|_| StoreError::Unavailable("record store lock poisoned".to_string()))
    }
}

impl HrRecordStore for InMemoryRecordStore {
    fn employee(&self, key: &EmployeeKey) -> Result<Option<EmployeeRecord>, StoreError> {
        let guard = self.read()?;
        Ok(guard.employees.iter().find(|e| &e.id == key).cloned())
    }

    fn employee_by_business_id(
        &self,
        employee_id: &str,
    ) -> Result<Option<EmployeeRecord>, StoreError> {
        let guard = self.read()?;
        Ok(guard
            .employees
            .iter()
            .find(|e| e.employee_id == employee_id)
            .cloned())
    }

    fn goal(&self, key: &GoalKey) -> Result<Option<GoalRecord>, StoreError> {
        let guard = self.read()?;
        Ok(guard.goals.iter().find(|g| &g.id == key).cloned())
    }

    fn goal_by_business_id(&self, goal_id: &str) -> Result<Option<GoalRecord>, StoreError> {
        let guard = self.read()?;
        Ok(guard.goals.iter().find(|g| g.goal_id == goal_id).cloned())
    }

    fn goals_owned_by(&self, owner: &EmployeeKey) -> Result<Vec<GoalRecord>, StoreError> {
        let guard = self.read()?;
        Ok(guard
            .goals
            .iter()
            .filter(|g| g.owner_employee_id.as_deref() == Some(owner.0.as_str()))
            .cloned()
            .collect())
    }

    fn reviews_for(&self, employee: &EmployeeKey) -> Result<Vec<ReviewRecord>, StoreError> {
        let guard = self.read()?;
        Ok(guard
            .reviews
            .iter()
            .filter(|r| r.employee_id == employee.0)
            .cloned()
            .collect())
    }

    fn feedback_for(&self, receiver: &EmployeeKey) -> Result<Vec<FeedbackRecord>, StoreError> {
        let guard = self.read()?;
        Ok(guard
            .feedback
            .iter()
            .filter(|f| f.receiver_id == receiver.0)
            .cloned()
            .collect())
    }

    fn all_goals(&self) -> Result<Vec<GoalRecord>, StoreError> {
        Ok(self.read()?.goals.clone())
    }

    fn all_reviews(&self) -> Result<Vec<ReviewRecord>, StoreError> {
        Ok(self.read()?.reviews.clone())
    }

    fn all_feedback(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        Ok(self.read()?.feedback.clone())
    }
}

/// Builds the service over the configured snapshot, or over seed records when none is set.
pub(crate) fn insight_service(config: &InsightsConfig) -> Result<Arc<Insights>, AppError> {
    let store = match &config.records_path {
        Some(path) => InMemoryRecordStore::load(path)?,
        None => InMemoryRecordStore::from_snapshot(seed_snapshot(Utc::now())),
    };
    let models = FsModelStore::new(&config.model_dir);
    Ok(Arc::new(InsightService::new(
        Arc::new(store),
        Arc::new(models),
    )))
}

/// Demonstration records anchored at `anchor`: one employee on track, one falling behind, and
/// enough review history to train both classifiers.
pub(crate) fn seed_snapshot(anchor: DateTime<Utc>) -> HrSnapshot {
    let employees = vec![
        seed_employee("emp-001", "EMP1A2B3C4D", "Amara", "Osei", Some(78.0)),
        seed_employee("emp-002", "EMP5E6F7A8B", "Lukas", "Brandt", Some(34.0)),
        seed_employee("emp-003", "EMP9C0D1E2F", "Mei", "Tanaka", None),
    ];

    let goals = [
        ("goal-001", "GOL9F8E7D6C", "emp-001", GoalStatus::Completed, 100.0, -20),
        ("goal-002", "GOL3B4A5C6D", "emp-001", GoalStatus::InProgress, 65.0, 12),
        ("goal-003", "GOL7E8F9A0B", "emp-002", GoalStatus::AtRisk, 15.0, 5),
        ("goal-004", "GOL1C2D3E4F", "emp-002", GoalStatus::Cancelled, 10.0, -30),
        ("goal-005", "GOL5A6B7C8D", "emp-003", GoalStatus::Done, 100.0, -8),
        ("goal-006", "GOL9E0F1A2B", "emp-003", GoalStatus::NotStarted, 0.0, 45),
    ]
    .into_iter()
    .map(|(key, goal_id, owner, status, progress, due_in_days)| {
        seed_goal(anchor, key, goal_id, owner, status, progress, due_in_days)
    })
    .collect();

    let reviews = (0..10)
        .map(|index| {
            let (employee, rating) = match index % 3 {
                0 => ("emp-001", 4.5),
                1 => ("emp-002", 2.5),
                _ => ("emp-003", 4.0),
            };
            seed_review(anchor, index, employee, rating)
        })
        .collect();

    let feedback = vec![
        seed_feedback(anchor, 1, "emp-001", Some(4.5), Some(0.6)),
        seed_feedback(anchor, 2, "emp-001", Some(4.0), Some(0.3)),
        seed_feedback(anchor, 3, "emp-002", Some(2.0), Some(-0.4)),
        seed_feedback(anchor, 4, "emp-002", None, Some(-0.1)),
        seed_feedback(anchor, 5, "emp-003", Some(3.5), None),
    ];

    HrSnapshot {
        employees,
        goals,
        reviews,
        feedback,
    }
}

fn seed_employee(
    key: &str,
    business_id: &str,
    first_name: &str,
    last_name: &str,
    engagement: Option<f64>,
) -> EmployeeRecord {
    EmployeeRecord {
        id: EmployeeKey(key.to_string()),
        employee_id: business_id.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        department: Some("Customer Success".to_string()),
        engagement_score: engagement,
    }
}

fn seed_goal(
    anchor: DateTime<Utc>,
    key: &str,
    goal_id: &str,
    owner: &str,
    status: GoalStatus,
    progress: f64,
    due_in_days: i64,
) -> GoalRecord {
    let due = anchor + Duration::days(due_in_days);
    GoalRecord {
        id: GoalKey(key.to_string()),
        goal_id: goal_id.to_string(),
        owner_employee_id: Some(owner.to_string()),
        title: format!("Quarterly objective {goal_id}"),
        status,
        progress_percentage: progress,
        start_date: anchor - Duration::days(90),
        due_date: Some(due),
        completed_date: status.is_closed().then(|| due - Duration::days(3)),
        assignees: vec![GoalAssignee {
            assignee_id: owner.to_string(),
            role: AssignmentRole::Owner,
            allocation_percent: Some(100.0),
        }],
    }
}

fn seed_review(anchor: DateTime<Utc>, index: i64, employee: &str, rating: f64) -> ReviewRecord {
    let strong = rating >= 4.0;
    let items = |count: usize, label: &str| -> Vec<String> {
        (1..=count).map(|n| format!("{label} {n}")).collect()
    };
    ReviewRecord {
        id: format!("rev-{index:03}"),
        review_id: format!("REV{index:08}"),
        employee_id: employee.to_string(),
        reviewer_id: "emp-000".to_string(),
        overall_rating: rating,
        strengths: items(if strong { 3 } else { 1 }, "strength"),
        areas_for_improvement: items(if strong { 1 } else { 3 }, "improvement"),
        achievements: items(if strong { 2 } else { 0 }, "achievement"),
        goals_achieved: items(if strong { 2 } else { 0 }, "goal"),
        goals_missed: items(if strong { 0 } else { 2 }, "goal"),
        feedback_collected: items(2, "feedback"),
        created_at: anchor - Duration::days(30 * (index + 1)),
    }
}

fn seed_feedback(
    anchor: DateTime<Utc>,
    index: usize,
    receiver: &str,
    rating: Option<f64>,
    sentiment: Option<f64>,
) -> FeedbackRecord {
    FeedbackRecord {
        id: format!("fb-{index:03}"),
        feedback_id: format!("FDB{index:08}"),
        receiver_id: receiver.to_string(),
        giver_id: "emp-000".to_string(),
        rating,
        sentiment_score: sentiment,
        created_at: anchor - Duration::days(index as i64 * 4),
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD"))
}
