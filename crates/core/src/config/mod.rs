// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow configuration loaded from TOML

mod workflow;

pub use workflow::{
    ConfigError, SemaphoreEntry, Settings, TableConfig, WorkflowConfig, DONE_STATE,
};
