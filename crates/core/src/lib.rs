// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gk-core: Core library for gatekeep
//!
//! This crate provides:
//! - State graphs, fragments and their States-Language rendering
//! - Lock records and pure conditional-write semantics
//! - The semaphore protocol assembler and its lock registry
//! - Workflow configuration

pub mod clock;
pub mod config;
pub mod coordination;
pub mod graph;
pub mod id;
pub mod lock;
pub mod payload;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, WorkflowConfig};
pub use coordination::{
    LockRegistry, LockTableSpec, MarkerDetection, SemaphoreError, SemaphoreGenerator,
    SemaphoreRequest,
};
pub use graph::{Fragment, GraphError, StateGraph, StateId, StateKind};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use lock::{ExecutionContext, LockItem, LockOperation, LockRecord};
pub use payload::{JsonPath, ResultPath};
