// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod completions;
pub mod inspect;
pub mod render;
pub mod simulate;

use anyhow::Context;
use gk_core::WorkflowConfig;
use std::path::Path;

/// Workflow used when no config file is given
pub const DEFAULT_WORKFLOW: &str = r#"
[[semaphore]]
lock = "life"
limit = 1
job = "work"
"#;

pub fn load_workflow(path: Option<&Path>) -> anyhow::Result<WorkflowConfig> {
    match path {
        Some(path) => WorkflowConfig::load(path)
            .with_context(|| format!("loading workflow from {}", path.display())),
        None => Ok(WorkflowConfig::parse(DEFAULT_WORKFLOW)?),
    }
}
