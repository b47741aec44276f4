// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conditional write expressions over lock records

use super::record::{LockItem, LockRecord};
use serde::{Deserialize, Serialize};

/// Predicate over the current state of a row
///
/// Evaluated against `None` when the row does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Always,
    /// The row must not exist yet
    NotExists,
    /// The holder count must differ from `limit`
    CountNotEquals { limit: i64 },
    /// The execution must not hold a marker
    MarkerAbsent { owner: String },
    /// The execution must hold a marker
    MarkerPresent { owner: String },
    All { conditions: Vec<Condition> },
}

impl Condition {
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::All {
            conditions: conditions.into_iter().collect(),
        }
    }

    pub fn evaluate(&self, record: Option<&LockRecord>) -> bool {
        match self {
            Condition::Always => true,
            Condition::NotExists => record.is_none(),
            // A comparison against a missing attribute is false
            Condition::CountNotEquals { limit } => {
                record.is_some_and(|r| r.current_count != *limit)
            }
            Condition::MarkerAbsent { owner } => !record.is_some_and(|r| r.is_held_by(owner)),
            Condition::MarkerPresent { owner } => record.is_some_and(|r| r.is_held_by(owner)),
            Condition::All { conditions } => conditions.iter().all(|c| c.evaluate(record)),
        }
    }

    /// Human-readable condition expression
    pub fn expression(&self) -> String {
        match self {
            Condition::Always => "true".to_string(),
            Condition::NotExists => "attribute_not_exists(LockName)".to_string(),
            Condition::CountNotEquals { limit } => format!("currentlockcount <> {}", limit),
            Condition::MarkerAbsent { owner } => format!("attribute_not_exists({})", owner),
            Condition::MarkerPresent { owner } => format!("attribute_exists({})", owner),
            Condition::All { conditions } => conditions
                .iter()
                .map(Condition::expression)
                .collect::<Vec<_>>()
                .join(" and "),
        }
    }
}

/// A single change applied by a conditional update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    AddToCount { delta: i64 },
    SetMarker { owner: String, acquired_at: String },
    RemoveMarker { owner: String },
}

impl Mutation {
    pub fn apply(&self, record: &mut LockRecord) {
        match self {
            Mutation::AddToCount { delta } => record.current_count += delta,
            Mutation::SetMarker { owner, acquired_at } => {
                record.owners.insert(owner.clone(), acquired_at.clone());
            }
            Mutation::RemoveMarker { owner } => {
                record.owners.remove(owner);
            }
        }
    }

    pub fn expression(&self) -> String {
        match self {
            Mutation::AddToCount { delta } if *delta < 0 => {
                format!("SET currentlockcount = currentlockcount - {}", -delta)
            }
            Mutation::AddToCount { delta } => {
                format!("SET currentlockcount = currentlockcount + {}", delta)
            }
            Mutation::SetMarker { owner, .. } => format!("SET {} = :lockacquiredtime", owner),
            Mutation::RemoveMarker { owner } => format!("REMOVE {}", owner),
        }
    }
}

/// Attributes to return from a read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub include_count: bool,
    /// Owner markers to include; `None` includes every marker
    pub owners: Option<Vec<String>>,
}

impl Projection {
    pub fn all() -> Self {
        Self {
            include_count: true,
            owners: None,
        }
    }

    /// Project only one execution's owner marker
    pub fn owner(execution_id: impl Into<String>) -> Self {
        Self {
            include_count: false,
            owners: Some(vec![execution_id.into()]),
        }
    }

    pub fn project(&self, record: &LockRecord) -> LockItem {
        let owners = match &self.owners {
            None => record.owners.clone(),
            Some(wanted) => record
                .owners
                .iter()
                .filter(|(owner, _)| wanted.contains(owner))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };
        LockItem {
            current_count: self.include_count.then_some(record.current_count),
            owners,
        }
    }
}

/// Why a conditional write was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotFound,
    ConditionFailed,
}

/// Apply a conditional update to the current row
///
/// Returns the new row and the attributes the update touched (counter and
/// newly set markers), or the reason it was rejected. Updates never create
/// rows.
pub fn apply_update(
    current: Option<&LockRecord>,
    condition: &Condition,
    mutations: &[Mutation],
) -> Result<(LockRecord, LockItem), Rejection> {
    let record = current.ok_or(Rejection::NotFound)?;
    if !condition.evaluate(Some(record)) {
        return Err(Rejection::ConditionFailed);
    }

    let mut updated = record.clone();
    let mut item = LockItem::default();
    for mutation in mutations {
        mutation.apply(&mut updated);
        match mutation {
            Mutation::AddToCount { .. } => item.current_count = Some(updated.current_count),
            Mutation::SetMarker { owner, acquired_at } => {
                item.owners.insert(owner.clone(), acquired_at.clone());
            }
            Mutation::RemoveMarker { .. } => {}
        }
    }
    Ok((updated, item))
}

/// Apply a conditional insert of a whole row
pub fn apply_insert(
    current: Option<&LockRecord>,
    record: &LockRecord,
    condition: &Condition,
) -> Result<LockRecord, Rejection> {
    if condition.evaluate(current) {
        Ok(record.clone())
    } else {
        Err(Rejection::ConditionFailed)
    }
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod tests;
