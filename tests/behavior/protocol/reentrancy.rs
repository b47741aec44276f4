//! Re-entrant acquire by an execution that already holds a slot

use crate::prelude::*;
use gk_adapters::FakeLockStore;
use gk_core::coordination::MarkerDetection;
use gk_engine::{JobRegistry, PassthroughJob};
use serde_json::json;

const CONTINUE: &str = "Continue Because life Lock Was Already Acquired: 1";

async fn reenter(detection: MarkerDetection) {
    let store = FakeLockStore::new();
    store.seed(held_record("life", &["exec-1"]));
    let (graph, workflow) = semaphored_with_detection(detection, "life", 2);
    let runtime = runtime(store.clone(), JobRegistry::new().with("work", PassthroughJob));

    let execution = runtime
        .run(&graph, workflow.entry(), "exec-1", json!({}))
        .await
        .unwrap();

    assert!(execution.succeeded(), "{:?}", execution.status);
    assert_eq!(execution.entries_of(CONTINUE), 1);
    assert_eq!(execution.entries_of("Wait to Get life Lock: 1"), 0);
    assert_eq!(execution.entries_of(JOB), 1);

    let record = store.record("life").unwrap();
    assert_eq!(record.current_count, 0);
    assert!(record.owners.is_empty());
}

#[tokio::test(start_paused = true)]
async fn held_marker_continues_into_job() {
    reenter(MarkerDetection::Structural).await;
}

#[tokio::test(start_paused = true)]
async fn held_marker_detected_by_timestamp_suffix() {
    reenter(MarkerDetection::TimestampSuffix).await;
}

#[tokio::test(start_paused = true)]
async fn rejected_acquire_is_retried_before_checking_owner() {
    let store = FakeLockStore::new();
    store.seed(held_record("life", &["exec-1"]));
    let (graph, workflow) = semaphored("life", 1);
    let runtime = runtime(store, JobRegistry::new().with("work", PassthroughJob));

    let execution = runtime
        .run(&graph, workflow.entry(), "exec-1", json!({}))
        .await
        .unwrap();

    assert_eq!(execution.retries().count(), 6);
    assert_eq!(execution.entries_of("Get Current life Lock Record: 1"), 1);
}

#[tokio::test(start_paused = true)]
async fn full_lock_held_by_others_waits() {
    let store = FakeLockStore::new();
    store.seed(held_record("life", &["exec-9"]));
    let (graph, workflow) = semaphored("life", 1);
    let runtime = runtime(store.clone(), JobRegistry::new().with("work", PassthroughJob));

    let waiting = runtime.run(&graph, workflow.entry(), "exec-1", json!({}));
    let outcome = tokio::time::timeout(std::time::Duration::from_secs(600), waiting).await;

    assert!(outcome.is_err(), "execution should still be polling");
    assert_eq!(store.record("life").unwrap().current_count, 1);
}
