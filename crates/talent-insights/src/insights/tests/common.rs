use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::insights::artifacts::{ArtifactStoreError, ModelArtifactStore};
use crate::insights::domain::{
    AssignmentRole, EmployeeKey, EmployeeRecord, FeedbackRecord, GoalAssignee, GoalKey,
    GoalRecord, GoalStatus, ReviewRecord,
};
use crate::insights::features::{EmployeeFeatures, GoalFeatures, NO_REVIEW_SENTINEL_DAYS};
use crate::insights::model::{
    ArtifactKey, LogisticClassifier, ModelKind, ModelMetrics, TrainedModelArtifact,
};
use crate::insights::service::InsightService;
use crate::insights::store::{HrRecordStore, StoreError};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub(super) fn employee(key: &str, business_id: &str, engagement: Option<f64>) -> EmployeeRecord {
    EmployeeRecord {
        id: EmployeeKey(key.to_string()),
        employee_id: business_id.to_string(),
        first_name: "Dana".to_string(),
        last_name: "Okafor".to_string(),
        department: Some("Platform".to_string()),
        engagement_score: engagement,
    }
}

pub(super) fn goal(key: &str, owner: &str, status: GoalStatus, progress: f64) -> GoalRecord {
    GoalRecord {
        id: GoalKey(key.to_string()),
        goal_id: format!("GOL-{key}"),
        owner_employee_id: Some(owner.to_string()),
        title: format!("Goal {key}"),
        status,
        progress_percentage: progress,
        start_date: now() - Duration::days(60),
        due_date: Some(now() + Duration::days(30)),
        completed_date: None,
        assignees: vec![GoalAssignee {
            assignee_id: owner.to_string(),
            role: AssignmentRole::Owner,
            allocation_percent: Some(100.0),
        }],
    }
}

pub(super) fn review(id: &str, employee: &str, rating: f64, days_ago: i64) -> ReviewRecord {
    ReviewRecord {
        id: id.to_string(),
        review_id: format!("REV-{id}"),
        employee_id: employee.to_string(),
        reviewer_id: "mgr-1".to_string(),
        overall_rating: rating,
        strengths: vec!["ownership".to_string(), "mentoring".to_string()],
        areas_for_improvement: vec!["estimation".to_string()],
        achievements: vec!["shipped billing v2".to_string()],
        goals_achieved: vec!["GOL-a".to_string()],
        goals_missed: Vec::new(),
        feedback_collected: vec!["fb-1".to_string(), "fb-2".to_string()],
        created_at: now() - Duration::days(days_ago),
    }
}

pub(super) fn feedback(
    id: &str,
    receiver: &str,
    rating: Option<f64>,
    sentiment: Option<f64>,
) -> FeedbackRecord {
    FeedbackRecord {
        id: id.to_string(),
        feedback_id: format!("FB-{id}"),
        receiver_id: receiver.to_string(),
        giver_id: "peer-1".to_string(),
        rating,
        sentiment_score: sentiment,
        created_at: now() - Duration::days(3),
    }
}

/// An employee with 4 goals (1 completed), feedback averaging 2.5, engagement 30 and no reviews.
pub(super) fn struggling_store() -> MemoryStore {
    let mut store = MemoryStore::default();
    store
        .employees
        .push(employee("emp-1", "EMP1A2B3C4D", Some(30.0)));
    store.goals.extend([
        goal("g-1", "emp-1", GoalStatus::Completed, 100.0),
        goal("g-2", "emp-1", GoalStatus::InProgress, 40.0),
        goal("g-3", "emp-1", GoalStatus::AtRisk, 10.0),
        goal("g-4", "emp-1", GoalStatus::NotStarted, 0.0),
    ]);
    store.feedback.extend([
        feedback("f-1", "emp-1", Some(2.0), Some(-0.2)),
        feedback("f-2", "emp-1", Some(3.0), None),
        feedback("f-3", "emp-1", None, Some(0.4)),
    ]);
    store
}

/// An employee with 10 goals (9 completed or done), no feedback, no engagement score.
pub(super) fn steady_store() -> MemoryStore {
    let mut store = MemoryStore::default();
    store.employees.push(employee("emp-2", "EMP5E6F7A8B", None));
    for index in 0..10 {
        let status = match index {
            0 => GoalStatus::InProgress,
            1 => GoalStatus::Done,
            _ => GoalStatus::Completed,
        };
        store
            .goals
            .push(goal(&format!("s-{index}"), "emp-2", status, 90.0));
    }
    store
}

/// A goal halfway done, due in 10 days, with two assignees.
pub(super) fn halfway_goal() -> GoalRecord {
    let mut record = goal("goal-1", "emp-3", GoalStatus::InProgress, 50.0);
    record.goal_id = "GOL9F8E7D6C".to_string();
    record.due_date = Some(now() + Duration::days(10));
    record.assignees.push(GoalAssignee {
        assignee_id: "emp-4".to_string(),
        role: AssignmentRole::Contributor,
        allocation_percent: None,
    });
    record
}

pub(super) fn struggling_features() -> EmployeeFeatures {
    EmployeeFeatures {
        employee_id: "emp-1".to_string(),
        num_goals: 4,
        goal_completion_rate: 0.25,
        avg_review_score: None,
        avg_feedback_rating: Some(2.5),
        avg_sentiment: None,
        avg_goal_progress: None,
        days_since_review: NO_REVIEW_SENTINEL_DAYS,
        engagement_score: Some(30.0),
        latest_review: None,
    }
}

pub(super) fn steady_features() -> EmployeeFeatures {
    EmployeeFeatures {
        employee_id: "emp-2".to_string(),
        num_goals: 10,
        goal_completion_rate: 0.9,
        avg_review_score: None,
        avg_feedback_rating: None,
        avg_sentiment: None,
        avg_goal_progress: None,
        days_since_review: NO_REVIEW_SENTINEL_DAYS,
        engagement_score: None,
        latest_review: None,
    }
}

pub(super) fn halfway_features() -> GoalFeatures {
    GoalFeatures {
        goal_id: "GOL9F8E7D6C".to_string(),
        progress_ratio: 0.5,
        days_left: 10,
        num_assignees: 2,
    }
}

/// A classifier with zero weights; it always predicts 0.5.
pub(super) fn coin_flip_artifact(key: ArtifactKey, columns: &[&str]) -> TrainedModelArtifact {
    let width = columns.len();
    TrainedModelArtifact {
        key,
        model: ModelKind::LogisticClassifier(LogisticClassifier {
            means: vec![0.0; width],
            scales: vec![1.0; width],
            weights: vec![0.0; width],
            intercept: 0.0,
        }),
        metrics: ModelMetrics {
            roc_auc: Some(0.5),
            rmse: Some(0.5),
            train_rows: 8,
            test_rows: 2,
        },
        feature_columns: columns.iter().map(|name| name.to_string()).collect(),
        trained_at: now() - Duration::days(1),
        sample_count: 10,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) employees: Vec<EmployeeRecord>,
    pub(super) goals: Vec<GoalRecord>,
    pub(super) reviews: Vec<ReviewRecord>,
    pub(super) feedback: Vec<FeedbackRecord>,
}

impl HrRecordStore for MemoryStore {
    fn employee(&self, key: &EmployeeKey) -> Result<Option<EmployeeRecord>, StoreError> {
        Ok(self.employees.iter().find(|e| &e.id == key).cloned())
    }

    fn employee_by_business_id(
        &self,
        employee_id: &str,
    ) -> Result<Option<EmployeeRecord>, StoreError> {
        Ok(self
            .employees
            .iter()
            .find(|e| e.employee_id == employee_id)
            .cloned())
    }

    fn goal(&self, key: &GoalKey) -> Result<Option<GoalRecord>, StoreError> {
        Ok(self.goals.iter().find(|g| &g.id == key).cloned())
    }

    fn goal_by_business_id(&self, goal_id: &str) -> Result<Option<GoalRecord>, StoreError> {
        Ok(self.goals.iter().find(|g| g.goal_id == goal_id).cloned())
    }

    fn goals_owned_by(&self, owner: &EmployeeKey) -> Result<Vec<GoalRecord>, StoreError> {
        Ok(self
            .goals
            .iter()
            .filter(|g| g.owner_employee_id.as_deref() == Some(owner.0.as_str()))
            .cloned()
            .collect())
    }

    fn reviews_for(&self, employee: &EmployeeKey) -> Result<Vec<ReviewRecord>, StoreError> {
        Ok(self
            .reviews
            .iter()
            .filter(|r| r.employee_id == employee.0)
            .cloned()
            .collect())
    }

    fn feedback_for(&self, receiver: &EmployeeKey) -> Result<Vec<FeedbackRecord>, StoreError> {
        Ok(self
            .feedback
            .iter()
            .filter(|f| f.receiver_id == receiver.0)
            .cloned()
            .collect())
    }

    fn all_goals(&self) -> Result<Vec<GoalRecord>, StoreError> {
        Ok(self.goals.clone())
    }

    fn all_reviews(&self) -> Result<Vec<ReviewRecord>, StoreError> {
        Ok(self.reviews.clone())
    }

    fn all_feedback(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        Ok(self.feedback.clone())
    }
}

pub(super) struct UnavailableStore;

fn outage<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("connection refused".to_string()))
}

impl HrRecordStore for UnavailableStore {
    fn employee(&self, _key: &EmployeeKey) -> Result<Option<EmployeeRecord>, StoreError> {
        outage()
    }

    fn employee_by_business_id(
        &self,
        _employee_id: &str,
    ) -> Result<Option<EmployeeRecord>, StoreError> {
        outage()
    }

    fn goal(&self, _key: &GoalKey) -> Result<Option<GoalRecord>, StoreError> {
        outage()
    }

    fn goal_by_business_id(&self, _goal_id: &str) -> Result<Option<GoalRecord>, StoreError> {
        outage()
    }

    fn goals_owned_by(&self, _owner: &EmployeeKey) -> Result<Vec<GoalRecord>, StoreError> {
        outage()
    }

    fn reviews_for(&self, _employee: &EmployeeKey) -> Result<Vec<ReviewRecord>, StoreError> {
        outage()
    }

    fn feedback_for(&self, _receiver: &EmployeeKey) -> Result<Vec<FeedbackRecord>, StoreError> {
        outage()
    }

    fn all_goals(&self) -> Result<Vec<GoalRecord>, StoreError> {
        outage()
    }

    fn all_reviews(&self) -> Result<Vec<ReviewRecord>, StoreError> {
        outage()
    }

    fn all_feedback(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        outage()
    }
}

/// Full-corpus reads stall for `delay`, as a large review collection does during training.
pub(super) struct SlowCorpusStore {
    inner: MemoryStore,
    delay: std::time::Duration,
    corpus_read_started: Arc<AtomicBool>,
}

impl SlowCorpusStore {
    pub(super) fn new(inner: MemoryStore, delay: std::time::Duration) -> Self {
        Self {
            inner,
            delay,
            corpus_read_started: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(super) fn corpus_read_started(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.corpus_read_started)
    }
}

impl HrRecordStore for SlowCorpusStore {
    fn employee(&self, key: &EmployeeKey) -> Result<Option<EmployeeRecord>, StoreError> {
        self.inner.employee(key)
    }

    fn employee_by_business_id(
        &self,
        employee_id: &str,
    ) -> Result<Option<EmployeeRecord>, StoreError> {
        self.inner.employee_by_business_id(employee_id)
    }

    fn goal(&self, key: &GoalKey) -> Result<Option<GoalRecord>, StoreError> {
        self.inner.goal(key)
    }

    fn goal_by_business_id(&self, goal_id: &str) -> Result<Option<GoalRecord>, StoreError> {
        self.inner.goal_by_business_id(goal_id)
    }

    fn goals_owned_by(&self, owner: &EmployeeKey) -> Result<Vec<GoalRecord>, StoreError> {
        self.inner.goals_owned_by(owner)
    }

    fn reviews_for(&self, employee: &EmployeeKey) -> Result<Vec<ReviewRecord>, StoreError> {
        self.inner.reviews_for(employee)
    }

    fn feedback_for(&self, receiver: &EmployeeKey) -> Result<Vec<FeedbackRecord>, StoreError> {
        self.inner.feedback_for(receiver)
    }

    fn all_goals(&self) -> Result<Vec<GoalRecord>, StoreError> {
        self.inner.all_goals()
    }

    fn all_reviews(&self) -> Result<Vec<ReviewRecord>, StoreError> {
        self.corpus_read_started.store(true, Ordering::SeqCst);
        thread::sleep(self.delay);
        self.inner.all_reviews()
    }

    fn all_feedback(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        self.inner.all_feedback()
    }
}

#[derive(Default)]
pub(super) struct MemoryModels {
    artifacts: Mutex<HashMap<ArtifactKey, TrainedModelArtifact>>,
}

impl MemoryModels {
    pub(super) fn with(artifacts: impl IntoIterator<Item = TrainedModelArtifact>) -> Self {
        let models = Self::default();
        {
            let mut guard = models.artifacts.lock().unwrap();
            for artifact in artifacts {
                guard.insert(artifact.key, artifact);
            }
        }
        models
    }

    pub(super) fn stored(&self, key: ArtifactKey) -> Option<TrainedModelArtifact> {
        self.artifacts.lock().unwrap().get(&key).cloned()
    }
}

impl ModelArtifactStore for MemoryModels {
    fn load(&self, key: ArtifactKey) -> Result<Option<TrainedModelArtifact>, ArtifactStoreError> {
        Ok(self.stored(key))
    }

    fn save(&self, artifact: &TrainedModelArtifact) -> Result<(), ArtifactStoreError> {
        self.artifacts
            .lock()
            .unwrap()
            .insert(artifact.key, artifact.clone());
        Ok(())
    }
}

/// Every load fails, as when the artifact directory holds a truncated file.
pub(super) struct BrokenModels;

impl ModelArtifactStore for BrokenModels {
    fn load(&self, _key: ArtifactKey) -> Result<Option<TrainedModelArtifact>, ArtifactStoreError> {
        Err(ArtifactStoreError::Unavailable("artifact volume offline".to_string()))
    }

    fn save(&self, _artifact: &TrainedModelArtifact) -> Result<(), ArtifactStoreError> {
        Err(ArtifactStoreError::Unavailable("artifact volume offline".to_string()))
    }
}

pub(super) fn service_with<S, M>(store: S, models: M) -> Arc<InsightService<S, M>>
where
    S: HrRecordStore + 'static,
    M: ModelArtifactStore + 'static,
{
    Arc::new(InsightService::new(Arc::new(store), Arc::new(models)))
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
