// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Description of the table holding lock records

use serde::{Deserialize, Serialize};

pub const DEFAULT_TABLE_NAME: &str = "StateMachineSemaphoreTable";
pub const PARTITION_KEY: &str = "LockName";

/// Provisioned read/write capacity hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCapacity {
    pub read: u32,
    pub write: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BillingMode {
    OnDemand,
    Provisioned { read: u32, write: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockTableSpec {
    pub name: String,
    pub partition_key: String,
    pub billing: BillingMode,
}

impl LockTableSpec {
    /// Capacity hints switch the table to provisioned billing
    pub fn new(name: impl Into<String>, capacity: Option<TableCapacity>) -> Self {
        Self {
            name: name.into(),
            partition_key: PARTITION_KEY.to_string(),
            billing: match capacity {
                Some(TableCapacity { read, write }) => BillingMode::Provisioned { read, write },
                None => BillingMode::OnDemand,
            },
        }
    }
}

impl Default for LockTableSpec {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_NAME, None)
    }
}
