// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry and catch policies for task states

use super::StateId;
use crate::payload::ResultPath;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Error names a task can fail with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorName {
    /// A conditional write's predicate did not hold
    ConditionFailed,
    /// The lock row does not exist
    NotFound,
    /// Any other store failure
    StoreFailure,
    /// The protected job (or any job task) failed
    JobFailed,
}

impl ErrorName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorName::ConditionFailed => "Lock.ConditionalCheckFailed",
            ErrorName::NotFound => "Lock.ItemNotFound",
            ErrorName::StoreFailure => "Lock.StoreFailure",
            ErrorName::JobFailed => "Job.Failed",
        }
    }
}

impl fmt::Display for ErrorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which errors a retrier or catcher applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorMatcher {
    All,
    Only(Vec<ErrorName>),
}

impl ErrorMatcher {
    pub fn only(name: ErrorName) -> Self {
        ErrorMatcher::Only(vec![name])
    }

    pub fn matches(&self, error: ErrorName) -> bool {
        match self {
            ErrorMatcher::All => true,
            ErrorMatcher::Only(names) => names.contains(&error),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ErrorMatcher::All => serde_json::json!(["States.ALL"]),
            ErrorMatcher::Only(names) => names.iter().map(|n| n.as_str()).collect(),
        }
    }
}

/// Retry policy entry
///
/// The first retrier whose matcher accepts an error decides whether it is
/// retried; later retriers are not consulted for that error.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrier {
    pub errors: ErrorMatcher,
    pub max_attempts: u32,
    pub interval: Duration,
    pub backoff_rate: f64,
}

impl Retrier {
    pub fn new(errors: ErrorMatcher) -> Self {
        Self {
            errors,
            max_attempts: 3,
            interval: Duration::from_secs(1),
            backoff_rate: 2.0,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_backoff_rate(mut self, backoff_rate: f64) -> Self {
        self.backoff_rate = backoff_rate;
        self
    }

    /// Delay before the retry following `attempt` earlier retries
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.interval.as_secs_f64() * self.backoff_rate.powi(exponent);
        Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
    }
}

/// Route a failed task to a fallback state
#[derive(Debug, Clone, PartialEq)]
pub struct Catcher {
    pub errors: ErrorMatcher,
    pub next: StateId,
    pub result_path: ResultPath,
}

impl Catcher {
    pub fn new(errors: ErrorMatcher, next: StateId, result_path: ResultPath) -> Self {
        Self {
            errors,
            next,
            result_path,
        }
    }
}

/// Find the retrier responsible for an error
pub fn find_retrier(retriers: &[Retrier], error: ErrorName) -> Option<(usize, &Retrier)> {
    retriers
        .iter()
        .enumerate()
        .find(|(_, r)| r.errors.matches(error))
}

/// Find the catcher responsible for an error
pub fn find_catcher(catchers: &[Catcher], error: ErrorName) -> Option<&Catcher> {
    catchers.iter().find(|c| c.errors.matches(error))
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
