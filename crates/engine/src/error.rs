// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine runtime

use gk_core::GraphError;
use thiserror::Error;

/// Errors that stop the runtime from interpreting a graph
///
/// Failures inside the workflow are not errors: they end the execution
/// with a failed status.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("execution {execution_id} exceeded {limit} state transitions")]
    TransitionLimit { execution_id: String, limit: usize },
}
