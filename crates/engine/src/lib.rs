// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gatekeep reference orchestrator
//!
//! Interprets assembled state graphs one execution at a time: lock tasks go
//! to a [`gk_adapters::LockStore`], job tasks to a [`JobRegistry`].

mod error;
mod executor;
mod history;
mod job;
mod runtime;

pub use error::RuntimeError;
pub use executor::{Executor, TaskFailure};
pub use history::{Execution, ExecutionStatus, HistoryEvent};
pub use job::{JobError, JobHandler, JobRegistry, PassthroughJob, SleepJob};
pub use runtime::{Runtime, RuntimeConfig, DEFAULT_MAX_TRANSITIONS};
