use super::domain::{
    EmployeeKey, EmployeeRecord, FeedbackRecord, GoalKey, GoalRecord, ReviewRecord,
};

/// Read access to the HR document collections the insight engine derives features from.
///
/// Point lookups return `Ok(None)` for a miss; `Err` is reserved for the store itself failing.
pub trait HrRecordStore: Send + Sync {
    fn employee(&self, key: &EmployeeKey) -> Result<Option<EmployeeRecord>, StoreError>;
    fn employee_by_business_id(
        &self,
        employee_id: &str,
    ) -> Result<Option<EmployeeRecord>, StoreError>;

    fn goal(&self, key: &GoalKey) -> Result<Option<GoalRecord>, StoreError>;
    fn goal_by_business_id(&self, goal_id: &str) -> Result<Option<GoalRecord>, StoreError>;

    fn goals_owned_by(&self, owner: &EmployeeKey) -> Result<Vec<GoalRecord>, StoreError>;
    fn reviews_for(&self, employee: &EmployeeKey) -> Result<Vec<ReviewRecord>, StoreError>;
    fn feedback_for(&self, receiver: &EmployeeKey) -> Result<Vec<FeedbackRecord>, StoreError>;

    fn all_goals(&self) -> Result<Vec<GoalRecord>, StoreError>;
    fn all_reviews(&self) -> Result<Vec<ReviewRecord>, StoreError>;
    fn all_feedback(&self) -> Result<Vec<FeedbackRecord>, StoreError>;
}

/// Error enumeration for collaborator store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}
