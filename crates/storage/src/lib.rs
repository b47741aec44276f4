// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gk-storage: Durable lock table storage
//!
//! Lock records are materialized from a write-ahead log of applied table
//! operations. Conditions are evaluated before an operation is logged, so
//! replay only re-applies the recorded changes.

mod operation;
mod state;
mod wal;

pub use operation::TableOperation;
pub use state::LockTable;
pub use wal::{Wal, WalError};
