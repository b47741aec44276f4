// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock table adapters
//!
//! Every store evaluates conditions with the shared semantics in
//! `gk_core::lock`, holding a per-table mutex across the read-check-write so
//! each operation is linearizable per key.

mod memory;
mod wal;

pub use memory::MemoryLockStore;
pub use wal::WalLockStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeLockStore, StoreCall};

use async_trait::async_trait;
use gk_core::graph::ErrorName;
use gk_core::lock::{Condition, Mutation, Projection, Rejection};
use gk_core::{LockItem, LockRecord};
use thiserror::Error;

/// Errors from lock store operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("conditional check failed for lock {0}")]
    ConditionFailed(String),
    #[error("lock record not found: {0}")]
    NotFound(String),
    #[error("lock store unavailable: {0}")]
    Unavailable(String),
    #[error("lock store error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn rejected(rejection: Rejection, key: &str) -> Self {
        match rejection {
            Rejection::NotFound => StoreError::NotFound(key.to_string()),
            Rejection::ConditionFailed => StoreError::ConditionFailed(key.to_string()),
        }
    }

    /// Error name matched by retry and catch policies
    pub fn error_name(&self) -> ErrorName {
        match self {
            StoreError::ConditionFailed(_) => ErrorName::ConditionFailed,
            StoreError::NotFound(_) => ErrorName::NotFound,
            StoreError::Unavailable(_) | StoreError::Storage(_) => ErrorName::StoreFailure,
        }
    }
}

/// Conditional access to the lock table, keyed by lock name
#[async_trait]
pub trait LockStore: Clone + Send + Sync + 'static {
    /// Apply mutations to an existing row if `condition` holds
    ///
    /// Returns the touched attributes after the update.
    async fn conditional_update(
        &self,
        key: &str,
        condition: &Condition,
        mutations: &[Mutation],
    ) -> Result<LockItem, StoreError>;

    /// Store a whole row if `condition` holds
    async fn conditional_insert(
        &self,
        record: &LockRecord,
        condition: &Condition,
    ) -> Result<(), StoreError>;

    /// Projected read of a row, `None` if it does not exist
    async fn get(&self, key: &str, projection: &Projection)
        -> Result<Option<LockItem>, StoreError>;

    /// Snapshot of every row
    async fn records(&self) -> Result<Vec<LockRecord>, StoreError>;
}
