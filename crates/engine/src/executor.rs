// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task executor

use crate::job::{JobError, JobRegistry};
use gk_adapters::{LockStore, StoreError};
use gk_core::graph::{ErrorName, TaskResource};
use gk_core::lock::{fetch_result, update_result, StoreRequest};
use gk_core::ExecutionContext;
use serde_json::{json, Value};

/// A task attempt that ended in a named error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub error: ErrorName,
    pub cause: String,
}

impl TaskFailure {
    /// Error output as written by a catcher
    pub fn to_json(&self) -> Value {
        json!({ "Error": self.error.as_str(), "Cause": self.cause })
    }
}

impl From<StoreError> for TaskFailure {
    fn from(err: StoreError) -> Self {
        Self {
            error: err.error_name(),
            cause: err.to_string(),
        }
    }
}

impl From<JobError> for TaskFailure {
    fn from(err: JobError) -> Self {
        Self {
            error: ErrorName::JobFailed,
            cause: err.to_string(),
        }
    }
}

/// Runs task resources against the lock store and job registry
pub struct Executor<S> {
    store: S,
    jobs: JobRegistry,
}

impl<S: LockStore> Executor<S> {
    pub fn new(store: S, jobs: JobRegistry) -> Self {
        Self { store, jobs }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one attempt of a task with tracing
    pub async fn execute(
        &self,
        resource: &TaskResource,
        ctx: &ExecutionContext,
        input: &Value,
    ) -> Result<Value, TaskFailure> {
        let result = self.execute_inner(resource, ctx, input).await;
        match &result {
            Ok(_) => tracing::debug!("task succeeded"),
            Err(failure) => tracing::debug!(
                error = %failure.error,
                cause = %failure.cause,
                "task failed"
            ),
        }
        result
    }

    async fn execute_inner(
        &self,
        resource: &TaskResource,
        ctx: &ExecutionContext,
        input: &Value,
    ) -> Result<Value, TaskFailure> {
        match resource {
            TaskResource::Lock(op) => match op.resolve(ctx) {
                StoreRequest::Update {
                    key,
                    condition,
                    mutations,
                } => {
                    let item = self
                        .store
                        .conditional_update(&key, &condition, &mutations)
                        .await?;
                    Ok(update_result(&item))
                }
                StoreRequest::Insert { record, condition } => {
                    self.store.conditional_insert(&record, &condition).await?;
                    Ok(json!({}))
                }
                StoreRequest::Get { key, projection } => {
                    let item = self.store.get(&key, &projection).await?;
                    Ok(fetch_result(item.as_ref(), &ctx.execution_id))
                }
            },
            TaskResource::Job(name) => {
                Ok(self.jobs.run(name, &ctx.execution_id, input.clone()).await?)
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
