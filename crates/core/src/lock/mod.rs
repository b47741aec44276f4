// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock records and the conditional operations that mutate them
//!
//! This module provides:
//! - **LockRecord** - The row stored per lock name
//! - **Condition / Mutation / Projection** - Store-independent expressions
//! - **apply_update / apply_insert** - Pure conditional-write semantics shared
//!   by every store implementation
//! - **LockOperation** - Declarative store calls embedded in graph states

mod expr;
mod operation;
mod record;

pub use expr::{apply_insert, apply_update, Condition, Mutation, Projection, Rejection};
pub use operation::{
    fetch_result, update_result, ExecutionContext, LockOperation, StoreRequest, HELD_SINCE_FIELD,
    ITEM_FIELD, ITEM_STRING_FIELD,
};
pub use record::{LockItem, LockRecord};
