//! Performance insights for the HR platform.
//!
//! The [`insights`] module derives feature records from goals, reviews, and feedback held by a
//! collaborator store, scores them with either a persisted model artifact or a deterministic
//! fallback formula, and attaches rule-based recommendations. Training runs out of band and
//! replaces the persisted artifacts wholesale.

pub mod config;
pub mod error;
pub mod insights;
pub mod telemetry;
