// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized lock table from WAL replay

use crate::{TableOperation, Wal, WalError};
use gk_core::lock::{apply_insert, apply_update, Condition, Mutation, Projection, Rejection};
use gk_core::{LockItem, LockRecord};
use std::collections::BTreeMap;
use std::path::Path;

/// Lock records keyed by lock name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockTable {
    records: BTreeMap<String, LockRecord>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a table from every operation in a WAL
    pub fn replay(path: &Path) -> Result<Self, WalError> {
        let mut table = Self::new();
        for op in Wal::replay(path)? {
            table.apply(&op);
        }
        Ok(table)
    }

    pub fn get(&self, lock_name: &str) -> Option<&LockRecord> {
        self.records.get(lock_name)
    }

    pub fn records(&self) -> impl Iterator<Item = &LockRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Apply an operation to update the table
    ///
    /// Updates against a missing row are ignored.
    pub fn apply(&mut self, op: &TableOperation) {
        match op {
            TableOperation::Put { record } => {
                self.records
                    .insert(record.lock_name.clone(), record.clone());
            }
            TableOperation::Update {
                lock_name,
                mutations,
            } => {
                if let Some(record) = self.records.get_mut(lock_name) {
                    for mutation in mutations {
                        mutation.apply(record);
                    }
                }
            }
        }
    }

    /// Evaluate and apply a conditional update
    ///
    /// Returns the touched attributes along with the operation to log.
    pub fn update(
        &mut self,
        lock_name: &str,
        condition: &Condition,
        mutations: &[Mutation],
    ) -> Result<(LockItem, TableOperation), Rejection> {
        let (updated, item) = apply_update(self.get(lock_name), condition, mutations)?;
        self.records.insert(lock_name.to_string(), updated);
        Ok((
            item,
            TableOperation::Update {
                lock_name: lock_name.to_string(),
                mutations: mutations.to_vec(),
            },
        ))
    }

    /// Evaluate and apply a conditional insert
    pub fn insert(
        &mut self,
        record: &LockRecord,
        condition: &Condition,
    ) -> Result<TableOperation, Rejection> {
        let stored = apply_insert(self.get(&record.lock_name), record, condition)?;
        self.records
            .insert(stored.lock_name.clone(), stored.clone());
        Ok(TableOperation::Put { record: stored })
    }

    /// Projected read of one row
    pub fn read(&self, lock_name: &str, projection: &Projection) -> Option<LockItem> {
        self.get(lock_name).map(|record| projection.project(record))
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
