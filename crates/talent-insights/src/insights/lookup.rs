//! Identifier resolution through an ordered list of lookup strategies.

use tracing::{debug, warn};

use super::domain::{EmployeeKey, EmployeeRecord, GoalKey, GoalRecord};
use super::store::{HrRecordStore, StoreError};

/// One way of turning a caller supplied identifier into a record.
pub struct LookupStrategy<S: ?Sized, T> {
    pub name: &'static str,
    pub find: fn(&S, &str) -> Result<Option<T>, StoreError>,
}

/// Tries each strategy in order and returns the first hit.
///
/// A strategy whose store call fails is skipped so a later strategy can still resolve the
/// identifier. When nothing matches, the last store failure (if any) is returned so callers can
/// tell an outage apart from a genuine miss.
pub fn resolve<S: ?Sized, T>(
    store: &S,
    raw_id: &str,
    strategies: &[LookupStrategy<S, T>],
) -> Result<Option<T>, StoreError> {
    if raw_id.trim().is_empty() {
        return Ok(None);
    }

    let mut last_failure = None;
    for strategy in strategies {
        match (strategy.find)(store, raw_id) {
            Ok(Some(found)) => {
                debug!(strategy = strategy.name, id = raw_id, "identifier resolved");
                return Ok(Some(found));
            }
            Ok(None) | Err(StoreError::NotFound) => {}
            Err(err) => {
                warn!(strategy = strategy.name, id = raw_id, error = %err, "lookup strategy failed");
                last_failure = Some(err);
            }
        }
    }

    match last_failure {
        Some(err) => Err(err),
        None => Ok(None),
    }
}

pub fn employee_strategies<S: HrRecordStore + ?Sized>() -> [LookupStrategy<S, EmployeeRecord>; 3] {
    [
        LookupStrategy {
            name: "primary_key",
            find: |store: &S, raw: &str| store.employee(&EmployeeKey(raw.to_string())),
        },
        LookupStrategy {
            name: "employee_id",
            find: |store: &S, raw: &str| store.employee_by_business_id(raw),
        },
        LookupStrategy {
            name: "trimmed_primary_key",
            find: |store: &S, raw: &str| {
                let trimmed = raw.trim();
                if trimmed == raw {
                    return Ok(None);
                }
                store.employee(&EmployeeKey(trimmed.to_string()))
            },
        },
    ]
}

pub fn goal_strategies<S: HrRecordStore + ?Sized>() -> [LookupStrategy<S, GoalRecord>; 3] {
    [
        LookupStrategy {
            name: "goal_id",
            find: |store: &S, raw: &str| store.goal_by_business_id(raw),
        },
        LookupStrategy {
            name: "primary_key",
            find: |store: &S, raw: &str| store.goal(&GoalKey(raw.to_string())),
        },
        LookupStrategy {
            name: "trimmed_primary_key",
            find: |store: &S, raw: &str| {
                let trimmed = raw.trim();
                if trimmed == raw {
                    return Ok(None);
                }
                store.goal(&GoalKey(trimmed.to_string()))
            },
        },
    ]
}

pub fn resolve_employee<S: HrRecordStore + ?Sized>(
    store: &S,
    raw_id: &str,
) -> Result<Option<EmployeeRecord>, StoreError> {
    resolve(store, raw_id, &employee_strategies::<S>())
}

pub fn resolve_goal<S: HrRecordStore + ?Sized>(
    store: &S,
    raw_id: &str,
) -> Result<Option<GoalRecord>, StoreError> {
    resolve(store, raw_id, &goal_strategies::<S>())
}
