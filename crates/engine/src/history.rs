// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution results and history

use gk_core::graph::ErrorName;
use serde_json::Value;
use std::time::Duration;

/// Something that happened during one execution
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    StateEntered { state: String, input: Value },
    TaskRetried {
        state: String,
        error: ErrorName,
        attempt: u32,
        delay: Duration,
    },
    TaskCaught {
        state: String,
        error: ErrorName,
        next: String,
    },
}

impl HistoryEvent {
    pub fn state(&self) -> &str {
        match self {
            HistoryEvent::StateEntered { state, .. }
            | HistoryEvent::TaskRetried { state, .. }
            | HistoryEvent::TaskCaught { state, .. } => state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Succeeded,
    Failed { error: String, cause: String },
}

/// Outcome of running one execution to a terminal state
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub id: String,
    pub status: ExecutionStatus,
    pub output: Value,
    pub history: Vec<HistoryEvent>,
}

impl Execution {
    pub fn succeeded(&self) -> bool {
        self.status == ExecutionStatus::Succeeded
    }

    /// Names of entered states, in order
    pub fn visited(&self) -> Vec<&str> {
        self.history
            .iter()
            .filter_map(|event| match event {
                HistoryEvent::StateEntered { state, .. } => Some(state.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of times the named state was entered
    pub fn entries_of(&self, state: &str) -> usize {
        self.visited().iter().filter(|s| **s == state).count()
    }

    pub fn retries(&self) -> impl Iterator<Item = &HistoryEvent> {
        self.history
            .iter()
            .filter(|e| matches!(e, HistoryEvent::TaskRetried { .. }))
    }
}
