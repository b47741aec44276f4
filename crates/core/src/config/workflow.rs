// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow configuration
//!
//! A TOML document listing semaphore-protected jobs to run in order:
//!
//! ```toml
//! [table]
//! name = "StateMachineSemaphoreTable"
//!
//! [settings]
//! poll_interval = "3s"
//!
//! [[semaphore]]
//! lock = "life"
//! limit = 1
//! job = "work"
//! ```

use crate::coordination::{
    LockRegistry, LockTableSpec, MarkerDetection, SemaphoreError, SemaphoreGenerator,
    SemaphoreRequest, TableCapacity, DEFAULT_POLL_INTERVAL, DEFAULT_TABLE_NAME,
};
use crate::graph::{Fragment, GraphError, StateGraph, StateKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the terminal state every assembled workflow ends in
pub const DONE_STATE: &str = "Done";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Semaphore(#[from] SemaphoreError),
}

impl From<GraphError> for ConfigError {
    fn from(err: GraphError) -> Self {
        ConfigError::Semaphore(err.into())
    }
}

/// The `[table]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    pub name: String,
    pub read_capacity: Option<u32>,
    pub write_capacity: Option<u32>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_TABLE_NAME.to_string(),
            read_capacity: None,
            write_capacity: None,
        }
    }
}

impl TableConfig {
    fn capacity(&self) -> Result<Option<TableCapacity>, ConfigError> {
        match (self.read_capacity, self.write_capacity) {
            (None, None) => Ok(None),
            (Some(read), Some(write)) if read > 0 && write > 0 => {
                Ok(Some(TableCapacity { read, write }))
            }
            (Some(_), Some(_)) => Err(ConfigError::Invalid(
                "table capacities must be positive".to_string(),
            )),
            _ => Err(ConfigError::Invalid(
                "read_capacity and write_capacity must be given together".to_string(),
            )),
        }
    }

    pub fn to_spec(&self) -> Result<LockTableSpec, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("table name must not be empty".to_string()));
        }
        Ok(LockTableSpec::new(self.name.clone(), self.capacity()?))
    }
}

/// The `[settings]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Delay between acquire attempts while the lock is full
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    pub marker_detection: MarkerDetection,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            marker_detection: MarkerDetection::default(),
        }
    }
}

/// One `[[semaphore]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SemaphoreEntry {
    pub lock: String,
    pub limit: u32,
    /// Name of the job to protect, resolved by the orchestrator at run time
    pub job: String,
    #[serde(default)]
    pub reuse_lock: bool,
    #[serde(default)]
    pub comments: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowConfig {
    pub table: TableConfig,
    pub settings: Settings,
    #[serde(rename = "semaphore")]
    pub semaphores: Vec<SemaphoreEntry>,
}

impl WorkflowConfig {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: WorkflowConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Check everything that does not need a graph
    ///
    /// Lock names are registered in file order, so conflicting entries are
    /// reported against the first definition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.to_spec()?;
        if self.semaphores.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one [[semaphore]] entry is required".to_string(),
            ));
        }
        let mut registry = LockRegistry::new();
        for entry in &self.semaphores {
            if entry.job.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "semaphore '{}' has an empty job name",
                    entry.lock
                )));
            }
            if entry.lock.trim().is_empty() {
                return Err(SemaphoreError::InvalidLockName.into());
            }
            if entry.limit == 0 {
                return Err(SemaphoreError::InvalidLimit {
                    lock_name: entry.lock.clone(),
                }
                .into());
            }
            registry.register(&entry.lock, entry.limit, entry.reuse_lock)?;
        }
        Ok(())
    }

    /// Build the workflow graph
    ///
    /// Each entry becomes a job state wrapped in its semaphore. Entries run
    /// in file order and the last one continues to a `Succeed` state.
    pub fn assemble(&self) -> Result<(StateGraph, Fragment, SemaphoreGenerator), ConfigError> {
        self.validate()?;

        let mut generator = SemaphoreGenerator::new(self.table.to_spec()?)
            .with_poll_interval(self.settings.poll_interval)
            .with_marker_detection(self.settings.marker_detection);
        let mut graph = StateGraph::new();
        let mut workflow: Option<Fragment> = None;

        for (index, entry) in self.semaphores.iter().enumerate() {
            let n = index + 1;
            let job = graph.add(
                format!("Run {} Job: {n}", entry.job),
                StateKind::job(entry.job.clone()),
            )?;
            let finished = graph.add(format!("Finished {} Job: {n}", entry.job), StateKind::pass())?;
            let request = SemaphoreRequest::new(
                entry.lock.clone(),
                entry.limit,
                Fragment::single(job),
                Fragment::single(finished),
            )
            .with_reuse_lock(entry.reuse_lock)
            .with_comments(entry.comments);
            let fragment = generator.generate_semaphored_job(&mut graph, request)?;

            workflow = Some(match workflow {
                Some(previous) => previous.next(&mut graph, fragment)?,
                None => fragment,
            });
        }

        let done = Fragment::single(graph.add(DONE_STATE, StateKind::Succeed)?);
        let workflow = workflow
            .ok_or_else(|| ConfigError::Invalid("no semaphores to assemble".to_string()))?
            .next(&mut graph, done)?;
        Ok((graph, workflow, generator))
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
