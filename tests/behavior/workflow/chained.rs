//! Workflows assembled from configuration with several semaphores

use crate::prelude::*;
use gk_adapters::{FakeLockStore, MemoryLockStore};
use gk_core::config::DONE_STATE;
use gk_core::coordination::{ACQUISITION_ERROR, LOCKINFO};
use gk_core::WorkflowConfig;
use gk_engine::{JobRegistry, PassthroughJob};
use serde_json::json;

const ALPHA_THEN_BETA: &str = r#"
[[semaphore]]
lock = "alpha"
limit = 1
job = "extract"

[[semaphore]]
lock = "beta"
limit = 3
job = "load"
"#;

#[tokio::test(start_paused = true)]
async fn chained_locks_share_one_table() {
    let config = WorkflowConfig::parse(ALPHA_THEN_BETA).unwrap();
    let (graph, workflow, generator) = config.assemble().unwrap();
    let store = MemoryLockStore::new();
    let jobs = JobRegistry::new()
        .with("extract", PassthroughJob)
        .with("load", PassthroughJob);

    let execution = runtime(store.clone(), jobs)
        .start(&graph, workflow.entry(), json!({"batch": 1}))
        .await
        .unwrap();

    assert!(execution.succeeded(), "{:?}", execution.status);
    let visited = execution.visited();
    let position = |name: &str| visited.iter().position(|s| *s == name).unwrap();
    assert!(position("Release alpha Lock: 1") < position("Acquire beta Lock: 1"));
    assert_eq!(visited.last(), Some(&DONE_STATE));
    assert_eq!(execution.output, json!({"batch": 1}));

    assert_eq!(generator.registry().get("alpha").map(|t| t.limit), Some(1));
    assert_eq!(generator.registry().get("beta").map(|t| t.limit), Some(3));
    assert_eq!(store.record("alpha").unwrap().current_count, 0);
    assert_eq!(store.record("beta").unwrap().current_count, 0);
}

#[tokio::test(start_paused = true)]
async fn reused_lock_is_taken_twice() {
    let config = WorkflowConfig::parse(
        r#"
[[semaphore]]
lock = "life"
limit = 1
job = "first"

[[semaphore]]
lock = "life"
limit = 1
job = "second"
reuse_lock = true
"#,
    )
    .unwrap();
    let (graph, workflow, _) = config.assemble().unwrap();
    let store = MemoryLockStore::new();
    let jobs = JobRegistry::new()
        .with("first", PassthroughJob)
        .with("second", PassthroughJob);

    let execution = runtime(store.clone(), jobs)
        .start(&graph, workflow.entry(), json!({}))
        .await
        .unwrap();

    assert!(execution.succeeded(), "{:?}", execution.status);
    assert_eq!(execution.entries_of("Enter life Protected Job: 1"), 1);
    assert_eq!(execution.entries_of("Enter life Protected Job: 2"), 1);
    assert_eq!(store.record("life").unwrap().current_count, 0);
}

#[tokio::test(start_paused = true)]
async fn release_anomaly_survives_next_lock() {
    let config = WorkflowConfig::parse(ALPHA_THEN_BETA).unwrap();
    let (graph, _, _) = config.assemble().unwrap();
    let store = FakeLockStore::new();
    store.seed(held_record("alpha", &["other"]));
    let jobs = JobRegistry::new()
        .with("extract", PassthroughJob)
        .with("load", PassthroughJob);
    let release_alpha = graph.find("Release alpha Lock: 1").unwrap();

    let execution = runtime(store.clone(), jobs)
        .run(&graph, release_alpha, "exec-1", json!({"batch": 1}))
        .await
        .unwrap();

    assert!(execution.succeeded(), "{:?}", execution.status);
    assert_eq!(execution.entries_of("Get beta Lock: 1"), 1);
    assert_eq!(execution.entries_of("Enter beta Protected Job: 1"), 1);
    assert_eq!(execution.output["batch"], 1);
    assert_eq!(
        execution.output[LOCKINFO][ACQUISITION_ERROR]["Error"],
        "Lock.ConditionalCheckFailed"
    );
    assert!(execution.output[LOCKINFO].get("acquirelock").is_none());
    assert_eq!(store.record("alpha").unwrap().current_count, 1);
    assert_eq!(store.record("beta").unwrap().current_count, 0);
}
