// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for the write-ahead log

use gk_core::lock::Mutation;
use gk_core::LockRecord;
use serde::{Deserialize, Serialize};

/// Applied changes to the lock table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableOperation {
    /// Store a whole record, replacing any existing row
    Put { record: LockRecord },

    /// Apply mutations to an existing row
    Update {
        lock_name: String,
        mutations: Vec<Mutation>,
    },
}

impl TableOperation {
    pub fn lock_name(&self) -> &str {
        match self {
            TableOperation::Put { record } => &record.lock_name,
            TableOperation::Update { lock_name, .. } => lock_name,
        }
    }
}
