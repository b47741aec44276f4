// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock store persisted to a write-ahead log

use super::{LockStore, StoreError};
use async_trait::async_trait;
use gk_core::lock::{apply_insert, apply_update, Condition, Mutation, Projection};
use gk_core::{LockItem, LockRecord};
use gk_storage::{LockTable, TableOperation, Wal, WalError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

struct Inner {
    table: LockTable,
    wal: Wal,
}

impl Inner {
    /// Log an accepted operation, then apply it to the table
    fn commit(&mut self, op: TableOperation) -> Result<(), StoreError> {
        self.wal
            .append(&op)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        self.table.apply(&op);
        Ok(())
    }
}

/// Lock store that replays its table from a WAL on open
///
/// Every accepted write is synced to the log before it becomes visible.
#[derive(Clone)]
pub struct WalLockStore {
    path: PathBuf,
    inner: Arc<Mutex<Inner>>,
}

impl WalLockStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, WalError> {
        let path = path.into();
        let table = LockTable::replay(&path)?;
        let wal = Wal::open(&path)?;
        Ok(Self {
            path,
            inner: Arc::new(Mutex::new(Inner { table, wal })),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of operations in the log
    pub fn sequence(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .wal
            .sequence()
    }
}

#[async_trait]
impl LockStore for WalLockStore {
    async fn conditional_update(
        &self,
        key: &str,
        condition: &Condition,
        mutations: &[Mutation],
    ) -> Result<LockItem, StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let (_, item) = apply_update(inner.table.get(key), condition, mutations)
            .map_err(|r| StoreError::rejected(r, key))?;
        inner.commit(TableOperation::Update {
            lock_name: key.to_string(),
            mutations: mutations.to_vec(),
        })?;
        Ok(item)
    }

    async fn conditional_insert(
        &self,
        record: &LockRecord,
        condition: &Condition,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let stored = apply_insert(inner.table.get(&record.lock_name), record, condition)
            .map_err(|r| StoreError::rejected(r, &record.lock_name))?;
        inner.commit(TableOperation::Put { record: stored })
    }

    async fn get(
        &self,
        key: &str,
        projection: &Projection,
    ) -> Result<Option<LockItem>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.table.read(key, projection))
    }

    async fn records(&self) -> Result<Vec<LockRecord>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.table.records().cloned().collect())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
