// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Counting semaphores for workflow executions
//!
//! This module provides:
//! - **SemaphoreGenerator** - Wraps a job fragment with acquire/release states
//! - **LockRegistry** - Per-scope limits and use counts of lock names
//! - **LockTableSpec** - The table the lock records live in

pub mod registry;
pub mod semaphore;
pub mod table;

pub use registry::{LockRegistry, UsageTracker};
pub use semaphore::{
    lockinfo_field, lockinfo_path, MarkerDetection, SemaphoreError, SemaphoreGenerator,
    SemaphoreRequest, ACQUIRE_RESULT, ACQUISITION_ERROR, CURRENT_ITEM, DEFAULT_POLL_INTERVAL,
    LOCKINFO,
};
pub use table::{BillingMode, LockTableSpec, TableCapacity, DEFAULT_TABLE_NAME, PARTITION_KEY};
