// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jobs run by task states

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("no job registered as {0}")]
    NotRegistered(String),
    #[error("{0}")]
    Failed(String),
}

/// A unit of work the workflow treats as opaque
#[async_trait]
pub trait JobHandler: Send + Sync + 'static {
    async fn run(&self, execution_id: &str, input: Value) -> Result<Value, JobError>;
}

/// Job handlers keyed by the name task states refer to
#[derive(Clone, Default)]
pub struct JobRegistry {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, handler: impl JobHandler) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    /// Builder form of [`JobRegistry::register`]
    pub fn with(mut self, name: impl Into<String>, handler: impl JobHandler) -> Self {
        self.register(name, handler);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(name).cloned()
    }

    pub async fn run(&self, name: &str, execution_id: &str, input: Value) -> Result<Value, JobError> {
        let handler = self
            .get(name)
            .ok_or_else(|| JobError::NotRegistered(name.to_string()))?;
        handler.run(execution_id, input).await
    }
}

impl fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("JobRegistry").field("jobs", &names).finish()
    }
}

/// Returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughJob;

#[async_trait]
impl JobHandler for PassthroughJob {
    async fn run(&self, _execution_id: &str, input: Value) -> Result<Value, JobError> {
        Ok(input)
    }
}

/// Sleeps, then returns its input unchanged
#[derive(Debug, Clone, Copy)]
pub struct SleepJob {
    pub duration: Duration,
}

impl SleepJob {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl JobHandler for SleepJob {
    async fn run(&self, _execution_id: &str, input: Value) -> Result<Value, JobError> {
        tokio::time::sleep(self.duration).await;
        Ok(input)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
