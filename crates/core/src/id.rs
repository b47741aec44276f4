// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution identifier generation
//!
//! Owner markers on a lock record are named by execution id, so ids must be
//! unique across every worker that can touch the same lock table.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates execution identifiers
pub trait IdGen: Clone + Send + Sync {
    fn next(&self) -> String;
}

/// UUID-based generator for production use
#[derive(Clone)]
pub struct UuidIdGen {
    prefix: String,
}

impl UuidIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for UuidIdGen {
    fn default() -> Self {
        Self::new("exec")
    }
}

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        format!("{}:{}", self.prefix, uuid::Uuid::new_v4())
    }
}

/// Sequential generator for deterministic tests
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("exec")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
