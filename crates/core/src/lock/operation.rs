// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative lock operations embedded in workflow states
//!
//! A `LockOperation` is fixed at assembly time. The execution id and the
//! state-entered timestamp are only known at run time, so the orchestrator
//! resolves an operation into a concrete `StoreRequest` per state entry.

use super::expr::{Condition, Mutation, Projection};
use super::record::{LockItem, LockRecord};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Field holding the projected item in a fetch result
pub const ITEM_FIELD: &str = "Item";
/// Field holding the item rendered as compact JSON
pub const ITEM_STRING_FIELD: &str = "ItemString";
/// Field holding this execution's acquisition time, present only when held
pub const HELD_SINCE_FIELD: &str = "HeldSince";

/// Values the orchestrator injects when a state is entered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    pub execution_id: String,
    pub entered_time: String,
}

impl ExecutionContext {
    pub fn new(execution_id: impl Into<String>, entered_time: impl Into<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            entered_time: entered_time.into(),
        }
    }
}

/// A store call performed by a protocol state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum LockOperation {
    /// Take a slot if the cap allows and this execution holds none
    Acquire {
        table: String,
        lock_name: String,
        limit: u32,
    },
    /// Create the row with a zero count if it does not exist
    Initialize { table: String, lock_name: String },
    /// Read this execution's owner marker
    FetchOwner { table: String, lock_name: String },
    /// Give back this execution's slot
    Release { table: String, lock_name: String },
}

/// A concrete request against the lock store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
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

impl LockOperation {
    pub fn name(&self) -> &'static str {
        match self {
            LockOperation::Acquire { .. } => "acquire",
            LockOperation::Initialize { .. } => "initialize",
            LockOperation::FetchOwner { .. } => "fetch_owner",
            LockOperation::Release { .. } => "release",
        }
    }

    pub fn lock_name(&self) -> &str {
        match self {
            LockOperation::Acquire { lock_name, .. }
            | LockOperation::Initialize { lock_name, .. }
            | LockOperation::FetchOwner { lock_name, .. }
            | LockOperation::Release { lock_name, .. } => lock_name,
        }
    }

    pub fn table(&self) -> &str {
        match self {
            LockOperation::Acquire { table, .. }
            | LockOperation::Initialize { table, .. }
            | LockOperation::FetchOwner { table, .. }
            | LockOperation::Release { table, .. } => table,
        }
    }

    /// Resolve into a store request for one state entry
    pub fn resolve(&self, ctx: &ExecutionContext) -> StoreRequest {
        let owner = ctx.execution_id.clone();
        match self {
            LockOperation::Acquire {
                lock_name, limit, ..
            } => StoreRequest::Update {
                key: lock_name.clone(),
                condition: Condition::all([
                    Condition::CountNotEquals {
                        limit: i64::from(*limit),
                    },
                    Condition::MarkerAbsent {
                        owner: owner.clone(),
                    },
                ]),
                mutations: vec![
                    Mutation::AddToCount { delta: 1 },
                    Mutation::SetMarker {
                        owner,
                        acquired_at: ctx.entered_time.clone(),
                    },
                ],
            },
            LockOperation::Initialize { lock_name, .. } => StoreRequest::Insert {
                record: LockRecord::new(lock_name.clone()),
                condition: Condition::NotExists,
            },
            LockOperation::FetchOwner { lock_name, .. } => StoreRequest::Get {
                key: lock_name.clone(),
                projection: Projection::owner(owner),
            },
            LockOperation::Release { lock_name, .. } => StoreRequest::Update {
                key: lock_name.clone(),
                condition: Condition::MarkerPresent {
                    owner: owner.clone(),
                },
                mutations: vec![
                    Mutation::AddToCount { delta: -1 },
                    Mutation::RemoveMarker { owner },
                ],
            },
        }
    }

    /// Rendered parameters for workflow definitions
    ///
    /// The execution id is shown symbolically since it is bound at run time.
    pub fn parameters(&self) -> serde_json::Value {
        let ctx = ExecutionContext::new("$$.Execution.Id", "$$.State.EnteredTime");
        let mut params = serde_json::json!({
            "TableName": self.table(),
            "Key": { "LockName": self.lock_name() },
        });
        match self.resolve(&ctx) {
            StoreRequest::Update {
                condition,
                mutations,
                ..
            } => {
                params["UpdateExpression"] = mutations
                    .iter()
                    .map(Mutation::expression)
                    .collect::<Vec<_>>()
                    .join(", ")
                    .into();
                params["ConditionExpression"] = condition.expression().into();
                params["ReturnValues"] = "UPDATED_NEW".into();
            }
            StoreRequest::Insert { condition, .. } => {
                params["Item"] = serde_json::json!({
                    "LockName": self.lock_name(),
                    "currentlockcount": 0,
                });
                params["ConditionExpression"] = condition.expression().into();
            }
            StoreRequest::Get { .. } => {
                params["ProjectionExpression"] = "$$.Execution.Id".into();
            }
        }
        params
    }
}

/// Result of a conditional update as seen by the payload
pub fn update_result(item: &LockItem) -> Value {
    json!({ "Attributes": item.to_attributes() })
}

/// Result of reading one execution's owner marker
///
/// A missing row yields an empty object. Otherwise the projected item is
/// included both as JSON and as its compact string rendering.
pub fn fetch_result(item: Option<&LockItem>, execution_id: &str) -> Value {
    let Some(item) = item else {
        return json!({});
    };
    let attributes = item.to_attributes();
    let mut result = json!({
        ITEM_FIELD: attributes,
        ITEM_STRING_FIELD: attributes.to_string(),
    });
    if let Some(acquired_at) = item.owners.get(execution_id) {
        result[HELD_SINCE_FIELD] = Value::String(acquired_at.clone());
    }
    result
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
