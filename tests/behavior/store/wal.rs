//! Lock tables persisted through the write-ahead log

use crate::prelude::*;
use gk_adapters::{LockStore, WalLockStore};
use gk_engine::{JobRegistry, PassthroughJob};
use gk_storage::LockTable;
use serde_json::json;
use tempfile::TempDir;

#[tokio::test(start_paused = true)]
async fn replay_matches_live_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("locks.wal");
    let store = WalLockStore::open(&path).unwrap();
    let (graph, workflow) = semaphored("life", 1);
    let runtime = runtime(store.clone(), JobRegistry::new().with("work", PassthroughJob));

    for _ in 0..3 {
        let execution = runtime.start(&graph, workflow.entry(), json!({})).await.unwrap();
        assert!(execution.succeeded());
    }

    let live = store.records().await.unwrap();
    let replayed = LockTable::replay(&path).unwrap();
    assert_eq!(replayed.records().cloned().collect::<Vec<_>>(), live);
    assert_eq!(replayed.get("life").unwrap().current_count, 0);
}

#[tokio::test(start_paused = true)]
async fn reopened_store_continues_from_log() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("locks.wal");
    let (graph, workflow) = semaphored("life", 1);

    let first = WalLockStore::open(&path).unwrap();
    runtime(first.clone(), JobRegistry::new().with("work", PassthroughJob))
        .start(&graph, workflow.entry(), json!({}))
        .await
        .unwrap();
    let written = first.sequence();
    drop(first);

    let reopened = WalLockStore::open(&path).unwrap();
    let execution = runtime(reopened.clone(), JobRegistry::new().with("work", PassthroughJob))
        .start(&graph, workflow.entry(), json!({}))
        .await
        .unwrap();

    assert!(execution.succeeded());
    assert_eq!(execution.entries_of("Initialize life Lock Item: 1"), 0);
    assert!(reopened.sequence() > written);
}
