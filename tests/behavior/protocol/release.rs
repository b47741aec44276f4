//! Release of slots that are not held by the releasing execution

use crate::prelude::*;
use gk_adapters::FakeLockStore;
use gk_core::coordination::{ACQUISITION_ERROR, LOCKINFO};
use gk_engine::{ExecutionStatus, JobRegistry, PassthroughJob};
use serde_json::json;

const RELEASE: &str = "Release life Lock: 1";

#[tokio::test(start_paused = true)]
async fn release_without_acquire_does_not_decrement() {
    let store = FakeLockStore::new();
    store.seed(held_record("life", &["exec-9"]));
    let (graph, _) = semaphored("life", 1);
    let release = graph.find(RELEASE).unwrap();
    let runtime = runtime(store.clone(), JobRegistry::new().with("work", PassthroughJob));

    let execution = runtime
        .run(&graph, release, "exec-1", json!({"keep": 1}))
        .await
        .unwrap();

    let record = store.record("life").unwrap();
    assert_eq!(record.current_count, 1);
    assert!(record.is_held_by("exec-9"));
    assert!(execution.succeeded());
    assert_eq!(execution.retries().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn release_anomaly_is_flagged_and_continues() {
    let store = FakeLockStore::new();
    store.seed(held_record("life", &["exec-9"]));
    let (graph, _) = semaphored("life", 1);
    let release = graph.find(RELEASE).unwrap();
    let runtime = runtime(store, JobRegistry::new().with("work", PassthroughJob));

    let execution = runtime
        .run(&graph, release, "exec-1", json!({"keep": 1}))
        .await
        .unwrap();

    assert_eq!(execution.visited(), vec![RELEASE, DONE]);
    assert_eq!(execution.output["keep"], 1);
    assert_eq!(
        execution.output[LOCKINFO][ACQUISITION_ERROR]["Error"],
        "Lock.ConditionalCheckFailed"
    );
}

#[tokio::test(start_paused = true)]
async fn release_of_missing_record_fails_after_retries() {
    let store = FakeLockStore::new();
    let (graph, _) = semaphored("life", 1);
    let release = graph.find(RELEASE).unwrap();
    let runtime = runtime(store, JobRegistry::new().with("work", PassthroughJob));

    let execution = runtime
        .run(&graph, release, "exec-1", json!({}))
        .await
        .unwrap();

    assert_eq!(execution.retries().count(), 5);
    assert!(matches!(
        execution.status,
        ExecutionStatus::Failed { ref error, .. } if error == "Lock.ItemNotFound"
    ));
    assert_eq!(execution.entries_of(DONE), 0);
}
