use super::common::*;
use std::sync::Arc;

use crate::insights::domain::{EmployeeKey, EmployeeRecord};
use crate::insights::features::{ExtractionError, FeatureExtractor};
use crate::insights::lookup::{resolve, resolve_employee, resolve_goal, LookupStrategy};
use crate::insights::store::StoreError;

#[test]
fn unresolvable_identifier_yields_not_found_without_partial_features() {
    let extractor = FeatureExtractor::new(Arc::new(struggling_store()));

    let result = extractor.extract_employee_features("EMP-DOES-NOT-EXIST", now());

    assert!(matches!(result, Err(ExtractionError::NotFound { .. })));
}

#[test]
fn employee_resolves_by_primary_key_first() {
    let store = struggling_store();

    let found = resolve_employee(&store, "emp-1").expect("lookup").expect("hit");

    assert_eq!(found.employee_id, "EMP1A2B3C4D");
}

#[test]
fn employee_resolves_by_business_identifier() {
    let store = struggling_store();

    let found = resolve_employee(&store, "EMP1A2B3C4D")
        .expect("lookup")
        .expect("hit");

    assert_eq!(found.id, EmployeeKey("emp-1".to_string()));
}

#[test]
fn padded_primary_key_resolves_through_trimmed_strategy() {
    let store = struggling_store();

    let found = resolve_employee(&store, "  emp-1 ").expect("lookup");

    assert!(found.is_some());
}

#[test]
fn goal_resolves_by_business_identifier_then_primary_key() {
    let mut store = MemoryStore::default();
    store.goals.push(halfway_goal());

    let by_business = resolve_goal(&store, "GOL9F8E7D6C").expect("lookup");
    let by_key = resolve_goal(&store, "goal-1").expect("lookup");

    assert!(by_business.is_some());
    assert_eq!(by_business, by_key);
}

#[test]
fn blank_identifier_never_reaches_the_store() {
    let found = resolve_employee(&UnavailableStore, "   ").expect("blank ids short-circuit");

    assert!(found.is_none());
}

#[test]
fn outage_in_every_strategy_is_propagated() {
    let err = resolve_employee(&UnavailableStore, "emp-1").expect_err("outage");

    assert!(matches!(err, StoreError::Unavailable(_)));
}

#[test]
fn later_strategy_recovers_from_earlier_failure() {
    let store = struggling_store();
    let strategies: [LookupStrategy<MemoryStore, EmployeeRecord>; 2] = [
        LookupStrategy {
            name: "flaky",
            find: |_store, _raw| Err(StoreError::Unavailable("timeout".to_string())),
        },
        LookupStrategy {
            name: "business_id",
            find: |store, raw| {
                Ok(store
                    .employees
                    .iter()
                    .find(|e| e.employee_id == raw)
                    .cloned())
            },
        },
    ];

    let found = resolve(&store, "EMP1A2B3C4D", &strategies).expect("recovered");

    assert!(found.is_some());
}

#[test]
fn store_not_found_counts_as_a_miss() {
    let store = struggling_store();
    let strategies: [LookupStrategy<MemoryStore, EmployeeRecord>; 1] = [LookupStrategy {
        name: "strict",
        find: |_store, _raw| Err(StoreError::NotFound),
    }];

    let found = resolve(&store, "emp-1", &strategies).expect("miss is not an error");

    assert!(found.is_none());
}
