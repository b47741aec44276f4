// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-scope bookkeeping of lock names
//!
//! Every fragment built under a lock name must agree on its limit, and a
//! lock name may only be reused when the caller opts in. The use count feeds
//! into state names so each reuse produces distinct states.

use super::semaphore::SemaphoreError;
use std::collections::HashMap;

/// Configured limit and number of fragments built for one lock name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageTracker {
    pub limit: u32,
    pub times_used: u32,
}

/// Lock name registry owned by one assembly scope
#[derive(Debug, Clone, Default)]
pub struct LockRegistry {
    trackers: HashMap<String, UsageTracker>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more use of `lock_name`, returning the new use count
    pub fn register(
        &mut self,
        lock_name: &str,
        limit: u32,
        reuse_allowed: bool,
    ) -> Result<u32, SemaphoreError> {
        let Some(tracker) = self.trackers.get_mut(lock_name) else {
            self.trackers.insert(
                lock_name.to_string(),
                UsageTracker {
                    limit,
                    times_used: 1,
                },
            );
            return Ok(1);
        };

        if tracker.limit != limit {
            return Err(SemaphoreError::LockRedefined {
                lock_name: lock_name.to_string(),
                given: limit,
                previous: tracker.limit,
            });
        }
        if !reuse_allowed {
            return Err(SemaphoreError::LockReuseNotAllowed {
                lock_name: lock_name.to_string(),
            });
        }

        tracker.times_used += 1;
        Ok(tracker.times_used)
    }

    pub fn get(&self, lock_name: &str) -> Option<&UsageTracker> {
        self.trackers.get(lock_name)
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UsageTracker)> {
        self.trackers.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
