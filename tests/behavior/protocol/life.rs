//! End-to-end traces of executions through the `life` lock

use crate::prelude::*;
use async_trait::async_trait;
use gk_adapters::{LockStore, MemoryLockStore, StoreError};
use gk_core::coordination::LOCKINFO;
use gk_core::lock::{Condition, Mutation, Projection};
use gk_core::{LockItem, LockRecord};
use gk_engine::{HistoryEvent, JobRegistry, PassthroughJob};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn first_execution_initializes_then_acquires() {
    let store = MemoryLockStore::new();
    let (graph, workflow) = semaphored("life", 1);
    let runtime = runtime(store.clone(), JobRegistry::new().with("work", PassthroughJob));

    let execution = runtime
        .start(&graph, workflow.entry(), json!({"ticket": 7}))
        .await
        .unwrap();

    assert!(execution.succeeded(), "{:?}", execution.status);
    assert_eq!(
        execution.visited(),
        vec![
            "Get life Lock: 1",
            "Acquire life Lock: 1",
            "Initialize life Lock Item: 1",
            "Acquire life Lock: 1",
            "Enter life Protected Job: 1",
            JOB,
            "Release life Lock: 1",
            DONE,
        ]
    );
    assert_eq!(execution.retries().count(), 0);
    assert_eq!(execution.output, json!({"ticket": 7}));
    assert!(execution.output.get(LOCKINFO).is_none());

    let record = store.record("life").unwrap();
    assert_eq!(record.current_count, 0);
    assert!(record.owners.is_empty());
}

#[tokio::test(start_paused = true)]
async fn job_sees_callers_input_unchanged() {
    let store = MemoryLockStore::new();
    let (graph, workflow) = semaphored("life", 1);
    let runtime = runtime(store, JobRegistry::new().with("work", PassthroughJob));
    let input = json!({"ticket": 7, "lockinfo": {"owner": "caller"}});

    let execution = runtime
        .start(&graph, workflow.entry(), input.clone())
        .await
        .unwrap();

    let job_input = execution
        .history
        .iter()
        .find_map(|event| match event {
            HistoryEvent::StateEntered { state, input } if state == JOB => Some(input.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(job_input, input);
    assert_eq!(execution.output, input);
}

#[tokio::test(start_paused = true)]
async fn second_execution_skips_initialize() {
    let store = MemoryLockStore::new();
    let (graph, workflow) = semaphored("life", 1);
    let runtime = runtime(store, JobRegistry::new().with("work", PassthroughJob));

    runtime.start(&graph, workflow.entry(), json!({})).await.unwrap();
    let second = runtime.start(&graph, workflow.entry(), json!({})).await.unwrap();

    assert_eq!(second.id, "exec-2");
    assert_eq!(second.entries_of("Initialize life Lock Item: 1"), 0);
    assert_eq!(second.entries_of("Acquire life Lock: 1"), 1);
}

/// Store wrapper logging each accepted acquire and release by owner
#[derive(Clone)]
struct JournalStore<S> {
    inner: S,
    journal: Arc<Mutex<Vec<(String, &'static str)>>>,
}

impl<S> JournalStore<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            journal: Arc::default(),
        }
    }

    fn entries(&self) -> Vec<(String, &'static str)> {
        self.journal.lock().unwrap().clone()
    }
}

#[async_trait]
impl<S: LockStore> LockStore for JournalStore<S> {
    async fn conditional_update(
        &self,
        key: &str,
        condition: &Condition,
        mutations: &[Mutation],
    ) -> Result<LockItem, StoreError> {
        let item = self.inner.conditional_update(key, condition, mutations).await?;
        let mut journal = self.journal.lock().unwrap();
        for mutation in mutations {
            match mutation {
                Mutation::SetMarker { owner, .. } => journal.push((owner.clone(), "acquire")),
                Mutation::RemoveMarker { owner } => journal.push((owner.clone(), "release")),
                Mutation::AddToCount { .. } => {}
            }
        }
        Ok(item)
    }

    async fn conditional_insert(
        &self,
        record: &LockRecord,
        condition: &Condition,
    ) -> Result<(), StoreError> {
        self.inner.conditional_insert(record, condition).await
    }

    async fn get(&self, key: &str, projection: &Projection) -> Result<Option<LockItem>, StoreError> {
        self.inner.get(key, projection).await
    }

    async fn records(&self) -> Result<Vec<LockRecord>, StoreError> {
        self.inner.records().await
    }
}

#[tokio::test(start_paused = true)]
async fn waiter_polls_until_holder_releases() {
    let store = JournalStore::new(MemoryLockStore::new());
    // Outlasts the 63s of acquire retries, so the waiter has to poll
    let gauge = GaugeJob::new(Duration::from_secs(100));
    let (graph, workflow) = semaphored("life", 1);
    let runtime = Arc::new(runtime(
        store.clone(),
        JobRegistry::new().with("work", gauge.clone()),
    ));
    let graph = Arc::new(graph);
    let start = workflow.entry();

    let spawn = |id: &'static str| {
        let runtime = Arc::clone(&runtime);
        let graph = Arc::clone(&graph);
        tokio::spawn(async move { runtime.run(&graph, start, id, json!({})).await })
    };
    let holder = spawn("exec-a");
    tokio::time::sleep(Duration::from_secs(1)).await;
    let waiter = spawn("exec-b");

    let holder = holder.await.unwrap().unwrap();
    let waiter = waiter.await.unwrap().unwrap();

    assert!(holder.succeeded(), "{:?}", holder.status);
    assert!(waiter.succeeded(), "{:?}", waiter.status);
    assert_eq!(holder.entries_of("Wait to Get life Lock: 1"), 0);
    assert!(waiter.entries_of("Wait to Get life Lock: 1") >= 1);
    assert!(waiter.entries_of("Get Current life Lock Record: 1") >= 1);
    assert!(waiter.retries().count() >= 6);
    assert_eq!(
        store.entries(),
        vec![
            ("exec-a".to_string(), "acquire"),
            ("exec-a".to_string(), "release"),
            ("exec-b".to_string(), "acquire"),
            ("exec-b".to_string(), "release"),
        ]
    );
    assert_eq!(gauge.peak(), 1);
    assert_eq!(gauge.runs(), 2);
}
