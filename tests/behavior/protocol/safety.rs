//! Concurrent executions never exceed the limit

use crate::prelude::*;
use gk_adapters::MemoryLockStore;
use gk_engine::JobRegistry;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Run `executions` concurrent executions against a lock of `limit` slots
async fn contend(limit: u32, executions: usize) -> (GaugeJob, MemoryLockStore) {
    let store = MemoryLockStore::new();
    let gauge = GaugeJob::new(Duration::from_secs(1));
    let (graph, workflow) = semaphored("life", limit);
    let runtime = Arc::new(runtime(
        YieldingStore::new(store.clone()),
        JobRegistry::new().with("work", gauge.clone()),
    ));
    let graph = Arc::new(graph);

    let mut set = JoinSet::new();
    for _ in 0..executions {
        let runtime = Arc::clone(&runtime);
        let graph = Arc::clone(&graph);
        let start = workflow.entry();
        set.spawn(async move { runtime.start(&graph, start, json!({})).await });
    }
    while let Some(joined) = set.join_next().await {
        let execution = joined.unwrap().unwrap();
        assert!(execution.succeeded(), "{}: {:?}", execution.id, execution.status);
    }
    (gauge, store)
}

#[tokio::test(start_paused = true)]
async fn single_slot_is_exclusive() {
    let (gauge, store) = contend(1, 5).await;

    assert_eq!(gauge.peak(), 1);
    assert_eq!(gauge.runs(), 5);
    assert_eq!(store.record("life").unwrap().current_count, 0);
}

#[tokio::test(start_paused = true)]
async fn holders_never_exceed_limit() {
    let (gauge, store) = contend(2, 8).await;

    assert_eq!(gauge.peak(), 2);
    assert_eq!(gauge.runs(), 8);
    let record = store.record("life").unwrap();
    assert_eq!(record.current_count, 0);
    assert!(record.owners.is_empty());
}

#[tokio::test(start_paused = true)]
async fn limit_above_demand_admits_everyone() {
    let (gauge, store) = contend(10, 4).await;

    assert_eq!(gauge.peak(), 4);
    assert!(store.record("life").unwrap().is_consistent());
}

#[tokio::test(start_paused = true)]
async fn first_use_race_initializes_once() {
    let store = MemoryLockStore::new();
    let (graph, workflow) = semaphored("life", 2);
    let runtime = Arc::new(runtime(
        YieldingStore::new(store.clone()),
        JobRegistry::new().with("work", GaugeJob::new(Duration::from_millis(10))),
    ));
    let graph = Arc::new(graph);

    let mut set = JoinSet::new();
    for _ in 0..2 {
        let runtime = Arc::clone(&runtime);
        let graph = Arc::clone(&graph);
        let start = workflow.entry();
        set.spawn(async move { runtime.start(&graph, start, json!({})).await });
    }
    let mut executions = Vec::new();
    while let Some(joined) = set.join_next().await {
        executions.push(joined.unwrap().unwrap());
    }

    let initialize = "Initialize life Lock Item: 1";
    assert!(executions.iter().all(|e| e.succeeded()));
    assert!(executions.iter().all(|e| e.entries_of(initialize) == 1));
    let lost_race = executions
        .iter()
        .filter(|e| {
            e.history.iter().any(|event| {
                matches!(event, gk_engine::HistoryEvent::TaskCaught { state, .. } if state == initialize)
            })
        })
        .count();
    assert_eq!(lost_race, 1);
    assert_eq!(store.record("life").unwrap().current_count, 0);
}
