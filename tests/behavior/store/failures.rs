//! Store failures the protocol does not classify

use crate::prelude::*;
use async_trait::async_trait;
use gk_adapters::{FakeLockStore, StoreError};
use gk_engine::{ExecutionStatus, JobError, JobHandler, JobRegistry, PassthroughJob};
use serde_json::{json, Value};
use std::time::Duration;

/// Job that makes the store fail the next `n` calls
struct Outage {
    store: FakeLockStore,
    n: usize,
}

#[async_trait]
impl JobHandler for Outage {
    async fn run(&self, _execution_id: &str, input: Value) -> Result<Value, JobError> {
        self.store
            .fail_next_n(StoreError::Unavailable("throttled".to_string()), self.n);
        Ok(input)
    }
}

#[tokio::test(start_paused = true)]
async fn acquire_fails_after_retry_budget() {
    let store = FakeLockStore::new();
    store.seed(held_record("life", &[]));
    store.fail_next_n(StoreError::Unavailable("throttled".to_string()), 7);
    let (graph, workflow) = semaphored("life", 1);
    let runtime = runtime(store.clone(), JobRegistry::new().with("work", PassthroughJob));

    let started = tokio::time::Instant::now();
    let execution = runtime.start(&graph, workflow.entry(), json!({})).await.unwrap();

    assert_eq!(
        execution.status,
        ExecutionStatus::Failed {
            error: "Lock.StoreFailure".to_string(),
            cause: "lock store unavailable: throttled".to_string(),
        }
    );
    assert_eq!(execution.retries().count(), 6);
    assert!(started.elapsed() >= Duration::from_secs(63));
    assert_eq!(execution.entries_of(JOB), 0);
    assert_eq!(store.record("life").unwrap().current_count, 0);
}

#[tokio::test(start_paused = true)]
async fn acquire_recovers_within_retry_budget() {
    let store = FakeLockStore::new();
    store.seed(held_record("life", &[]));
    store.fail_next_n(StoreError::Unavailable("throttled".to_string()), 3);
    let (graph, workflow) = semaphored("life", 1);
    let runtime = runtime(store, JobRegistry::new().with("work", PassthroughJob));

    let execution = runtime.start(&graph, workflow.entry(), json!({})).await.unwrap();

    assert!(execution.succeeded());
    assert_eq!(execution.retries().count(), 3);
}

#[tokio::test(start_paused = true)]
async fn release_outage_fails_and_leaks_slot() {
    let store = FakeLockStore::new();
    store.seed(held_record("life", &[]));
    let (graph, workflow) = semaphored("life", 1);
    let outage = Outage {
        store: store.clone(),
        n: 6,
    };
    let runtime = runtime(store.clone(), JobRegistry::new().with("work", outage));

    let execution = runtime.start(&graph, workflow.entry(), json!({})).await.unwrap();

    assert!(matches!(
        execution.status,
        ExecutionStatus::Failed { ref error, .. } if error == "Lock.StoreFailure"
    ));
    assert_eq!(execution.entries_of(DONE), 0);
    let record = store.record("life").unwrap();
    assert_eq!(record.current_count, 1);
    assert!(record.is_held_by("exec-1"));
}
