// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory lock store

use super::{LockStore, StoreError};
use async_trait::async_trait;
use gk_core::lock::{Condition, Mutation, Projection};
use gk_core::{LockItem, LockRecord};
use gk_storage::LockTable;
use std::sync::{Arc, Mutex};

/// Lock store that keeps its table in process memory
#[derive(Clone, Default)]
pub struct MemoryLockStore {
    table: Arc<Mutex<LockTable>>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of one record
    pub fn record(&self, key: &str) -> Option<LockRecord> {
        self.table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl LockStore for MemoryLockStore {
    async fn conditional_update(
        &self,
        key: &str,
        condition: &Condition,
        mutations: &[Mutation],
    ) -> Result<LockItem, StoreError> {
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
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        Ok(table.read(key, projection))
    }

    async fn records(&self) -> Result<Vec<LockRecord>, StoreError> {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        Ok(table.records().cloned().collect())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
