// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock record data model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row per lock name
///
/// `owners` maps an execution id to the timestamp at which it acquired its
/// slot. Outside of a conditional write, `current_count == owners.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub lock_name: String,
    pub current_count: i64,
    #[serde(default)]
    pub owners: BTreeMap<String, String>,
}

impl LockRecord {
    /// A freshly initialized record with no holders
    pub fn new(lock_name: impl Into<String>) -> Self {
        Self {
            lock_name: lock_name.into(),
            current_count: 0,
            owners: BTreeMap::new(),
        }
    }

    /// Check if the given execution holds a slot
    pub fn is_held_by(&self, execution_id: &str) -> bool {
        self.owners.contains_key(execution_id)
    }

    /// Acquisition timestamp of the given execution's slot
    pub fn acquired_at(&self, execution_id: &str) -> Option<&str> {
        self.owners.get(execution_id).map(String::as_str)
    }

    pub fn holders(&self) -> impl Iterator<Item = &str> {
        self.owners.keys().map(String::as_str)
    }

    /// Check that the counter agrees with the owner markers
    pub fn is_consistent(&self) -> bool {
        self.current_count >= 0 && self.current_count as usize == self.owners.len()
    }
}

/// Projected view of a record returned by reads and updates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_count: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub owners: BTreeMap<String, String>,
}

impl LockItem {
    /// Render the item to its flattened attribute map
    ///
    /// Owner markers become top-level attributes named by execution id, the
    /// way they are laid out in the table.
    pub fn to_attributes(&self) -> serde_json::Value {
        let mut attributes = serde_json::Map::new();
        if let Some(count) = self.current_count {
            attributes.insert("currentlockcount".to_string(), count.into());
        }
        for (owner, acquired_at) in &self.owners {
            attributes.insert(owner.clone(), acquired_at.clone().into());
        }
        serde_json::Value::Object(attributes)
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
