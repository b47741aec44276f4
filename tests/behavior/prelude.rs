//! Shared helpers for behavioral tests

#![allow(dead_code)]

use async_trait::async_trait;
use gk_adapters::{LockStore, StoreError};
use gk_core::coordination::MarkerDetection;
use gk_core::lock::{Condition, Mutation, Projection};
use gk_core::{
    Fragment, LockItem, LockRecord, SemaphoreGenerator, SemaphoreRequest, SequentialIdGen,
    StateGraph, StateKind, SystemClock,
};
use gk_engine::{JobError, JobHandler, JobRegistry, Runtime, RuntimeConfig};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const JOB: &str = "Work";
pub const DONE: &str = "Done";

pub type TestRuntime<S> = Runtime<S, SystemClock, SequentialIdGen>;

/// A single `work` job protected by `lock_name`, continuing to `Done`
pub fn semaphored(lock_name: &str, limit: u32) -> (StateGraph, Fragment) {
    semaphored_with(SemaphoreGenerator::default(), lock_name, limit)
}

pub fn semaphored_with_detection(
    detection: MarkerDetection,
    lock_name: &str,
    limit: u32,
) -> (StateGraph, Fragment) {
    semaphored_with(
        SemaphoreGenerator::default().with_marker_detection(detection),
        lock_name,
        limit,
    )
}

fn semaphored_with(
    mut generator: SemaphoreGenerator,
    lock_name: &str,
    limit: u32,
) -> (StateGraph, Fragment) {
    let mut graph = StateGraph::new();
    let job = Fragment::single(graph.add(JOB, StateKind::job("work")).unwrap());
    let done = Fragment::single(graph.add(DONE, StateKind::Succeed).unwrap());
    let fragment = generator
        .generate_semaphored_job(&mut graph, SemaphoreRequest::new(lock_name, limit, job, done))
        .unwrap();
    (graph, fragment)
}

pub fn runtime<S: LockStore>(store: S, jobs: JobRegistry) -> TestRuntime<S> {
    Runtime::new(
        store,
        jobs,
        SystemClock,
        SequentialIdGen::new("exec"),
        RuntimeConfig::default(),
    )
}

/// Job that tracks how many executions are inside it at once
#[derive(Clone, Default)]
pub struct GaugeJob {
    inside: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    runs: Arc<AtomicUsize>,
    hold: Duration,
}

impl GaugeJob {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            ..Self::default()
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobHandler for GaugeJob {
    async fn run(&self, _execution_id: &str, input: Value) -> Result<Value, JobError> {
        let now = self.inside.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.runs.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.hold).await;
        self.inside.fetch_sub(1, Ordering::SeqCst);
        Ok(input)
    }
}

/// Store wrapper that yields to the scheduler before every call
///
/// Lets concurrently spawned executions interleave between store calls on
/// a single-threaded runtime.
#[derive(Clone)]
pub struct YieldingStore<S> {
    inner: S,
}

impl<S> YieldingStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: LockStore> LockStore for YieldingStore<S> {
    async fn conditional_update(
        &self,
        key: &str,
        condition: &Condition,
        mutations: &[Mutation],
    ) -> Result<LockItem, StoreError> {
        tokio::task::yield_now().await;
        self.inner.conditional_update(key, condition, mutations).await
    }

    async fn conditional_insert(
        &self,
        record: &LockRecord,
        condition: &Condition,
    ) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.inner.conditional_insert(record, condition).await
    }

    async fn get(&self, key: &str, projection: &Projection) -> Result<Option<LockItem>, StoreError> {
        tokio::task::yield_now().await;
        self.inner.get(key, projection).await
    }

    async fn records(&self) -> Result<Vec<LockRecord>, StoreError> {
        self.inner.records().await
    }
}

/// A record held by `holders`, each acquired at a fixed timestamp
pub fn held_record(lock_name: &str, holders: &[&str]) -> LockRecord {
    let mut record = LockRecord::new(lock_name);
    for holder in holders {
        record
            .owners
            .insert(holder.to_string(), "2026-01-01T00:00:00.000Z".to_string());
    }
    record.current_count = holders.len() as i64;
    record
}
