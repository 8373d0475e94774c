//! Employee performance and goal-completion insights.
//!
//! Requests resolve a subject through [`lookup`], reduce its records to a feature snapshot in
//! [`features`], and score it with [`scoring`]. Employee scores also carry [`recommend`] hints.
//! [`trainer`] refits the persisted [`model`] artifacts out of band.

pub mod artifacts;
pub mod domain;
pub mod features;
pub mod lookup;
pub mod model;
pub mod recommend;
pub mod router;
pub mod scoring;
pub mod service;
pub mod store;
pub mod trainer;

pub use artifacts::{ArtifactStoreError, FsModelStore, ModelArtifactStore};
pub use domain::{
    AssignmentRole, EmployeeKey, EmployeeRecord, FeedbackRecord, GoalAssignee, GoalKey,
    GoalRecord, GoalStatus, ReviewRecord, SubjectKind,
};
pub use features::{EmployeeFeatures, ExtractionError, FeatureExtractor, GoalFeatures};
pub use model::{ArtifactKey, ModelKind, ModelMetrics, TrainedModelArtifact};
pub use recommend::recommend;
pub use router::insights_router;
pub use scoring::{ScoreMeta, Scorer, ScoringError, ScoringPath};
pub use service::{EmployeeScoreResult, GoalScoreResult, InsightService, InsightServiceError};
pub use store::{HrRecordStore, StoreError};
pub use trainer::{
    write_dataset_csv, TrainOutcome, Trainer, TrainingError, TrainingRow, TrainingSummary,
};

#[cfg(test)]
mod tests;
