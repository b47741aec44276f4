// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake lock store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{LockStore, StoreError};
use async_trait::async_trait;
use gk_core::lock::{Condition, Mutation, Projection};
use gk_core::{LockItem, LockRecord};
use gk_storage::LockTable;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Update {
        key: String,
        condition: Condition,
        mutations: Vec<Mutation>,
    },
    Insert {
        record: LockRecord,
        condition: Condition,
    },
    Get {
        key: String,
        projection: Projection,
    },
}

/// Fake lock store with call recording and failure injection
///
/// Injected failures are returned, in order, by the next calls of any kind
/// before the table is touched.
#[derive(Clone, Default)]
pub struct FakeLockStore {
    table: Arc<Mutex<LockTable>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    failures: Arc<Mutex<VecDeque<StoreError>>>,
}

impl FakeLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Fail the next call with `error`
    pub fn fail_next(&self, error: StoreError) {
        self.fail_next_n(error, 1);
    }

    /// Fail the next `n` calls with `error`
    pub fn fail_next_n(&self, error: StoreError, n: usize) {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        failures.extend(std::iter::repeat(error).take(n));
    }

    /// Store a record directly, bypassing conditions
    pub fn seed(&self, record: LockRecord) {
        self.table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .apply(&gk_storage::TableOperation::Put { record });
    }

    /// Get a copy of one record
    pub fn record(&self, key: &str) -> Option<LockRecord> {
        self.table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn record_call(&self, call: StoreCall) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        match self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LockStore for FakeLockStore {
    async fn conditional_update(
        &self,
        key: &str,
        condition: &Condition,
        mutations: &[Mutation],
    ) -> Result<LockItem, StoreError> {
        self.record_call(StoreCall::Update {
            key: key.to_string(),
            condition: condition.clone(),
            mutations: mutations.to_vec(),
        })?;

        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        let (item, _) = table
            .update(key, condition, mutations)
            .map_err(|r| StoreError::rejected(r, key))?;
        Ok(item)
    }

    async fn conditional_insert(
        &self,
        record: &LockRecord,
        condition: &Condition,
    ) -> Result<(), StoreError> {
        self.record_call(StoreCall::Insert {
            record: record.clone(),
            condition: condition.clone(),
        })?;

        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table
            .insert(record, condition)
            .map_err(|r| StoreError::rejected(r, &record.lock_name))?;
        Ok(())
    }

    async fn get(
        &self,
        key: &str,
        projection: &Projection,
    ) -> Result<Option<LockItem>, StoreError> {
        self.record_call(StoreCall::Get {
            key: key.to_string(),
            projection: projection.clone(),
        })?;

        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        Ok(table.read(key, projection))
    }

    async fn records(&self) -> Result<Vec<LockRecord>, StoreError> {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        Ok(table.records().cloned().collect())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
