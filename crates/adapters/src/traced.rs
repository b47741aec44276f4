// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::store::{LockStore, StoreError};
use async_trait::async_trait;
use gk_core::lock::{Condition, Mutation, Projection};
use gk_core::{LockItem, LockRecord};
use tracing::Instrument;

/// Wrapper that adds tracing to any LockStore
///
/// Condition failures are part of normal contention and log at debug;
/// anything else logs as an error.
#[derive(Clone)]
pub struct TracedLockStore<S> {
    inner: S,
}

impl<S> TracedLockStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

fn log_rejection(error: &StoreError, elapsed_ms: u64) {
    match error {
        StoreError::ConditionFailed(_) | StoreError::NotFound(_) => {
            tracing::debug!(elapsed_ms, error = %error, "rejected")
        }
        StoreError::Unavailable(_) | StoreError::Storage(_) => {
            tracing::error!(elapsed_ms, error = %error, "store call failed")
        }
    }
}

#[async_trait]
impl<S: LockStore> LockStore for TracedLockStore<S> {
    async fn conditional_update(
        &self,
        key: &str,
        condition: &Condition,
        mutations: &[Mutation],
    ) -> Result<LockItem, StoreError> {
        let span = tracing::info_span!("lock_store.update", key);
        async {
            tracing::debug!(
                condition = %condition.expression(),
                mutations = mutations.len(),
                "starting"
            );

            let start = std::time::Instant::now();
            let result = self.inner.conditional_update(key, condition, mutations).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(item) => tracing::info!(
                    elapsed_ms,
                    count = ?item.current_count,
                    "updated"
                ),
                Err(e) => log_rejection(e, elapsed_ms),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn conditional_insert(
        &self,
        record: &LockRecord,
        condition: &Condition,
    ) -> Result<(), StoreError> {
        let span = tracing::info_span!("lock_store.insert", key = %record.lock_name);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.conditional_insert(record, condition).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "inserted"),
                Err(e) => log_rejection(e, elapsed_ms),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn get(
        &self,
        key: &str,
        projection: &Projection,
    ) -> Result<Option<LockItem>, StoreError> {
        let span = tracing::debug_span!("lock_store.get", key);
        async {
            let result = self.inner.get(key, projection).await;
            match &result {
                Ok(item) => tracing::debug!(found = item.is_some(), "read"),
                Err(e) => tracing::error!(error = %e, "read failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn records(&self) -> Result<Vec<LockRecord>, StoreError> {
        let result = self.inner.records().await;
        tracing::trace!(records = ?result.as_ref().map(Vec::len).ok(), "listed");
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
