// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gk simulate` - Run concurrent executions of the assembled workflow

use super::inspect::RecordList;
use super::load_workflow;
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use gk_adapters::{LockStore, MemoryLockStore, TracedLockStore, WalLockStore};
use gk_core::{StateGraph, StateId, SystemClock, UuidIdGen};
use gk_engine::{ExecutionStatus, JobRegistry, Runtime, RuntimeConfig, SleepJob};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

#[derive(Args)]
pub struct SimulateArgs {
    /// Workflow file (a single `life` semaphore when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of concurrent executions
    #[arg(long, short = 'n', default_value_t = 4)]
    pub executions: usize,

    /// Persist the lock table to this WAL instead of memory
    #[arg(long)]
    pub wal: Option<PathBuf>,

    /// How long each job holds its slot
    #[arg(long, default_value = "100ms", value_parser = humantime::parse_duration)]
    pub hold: Duration,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Serialize)]
struct ExecutionLine {
    id: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    states: usize,
}

#[derive(Serialize)]
struct SimulationReport {
    executions: Vec<ExecutionLine>,
    records: RecordList,
}

impl SimulationReport {
    fn failed(&self) -> usize {
        self.executions.iter().filter(|e| e.error.is_some()).count()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<48} {:<10} STATES", "EXECUTION", "STATUS")?;
        for e in &self.executions {
            write!(f, "{:<48} {:<10} {}", e.id, e.status, e.states)?;
            if let Some(error) = &e.error {
                write!(f, "  {}", error)?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;
        write!(f, "{}", self.records)
    }
}

pub async fn simulate(args: SimulateArgs) -> Result<()> {
    if args.executions == 0 {
        anyhow::bail!("--executions must be at least 1");
    }
    let config = load_workflow(args.config.as_deref())?;
    let (graph, workflow, _) = config.assemble()?;

    let mut jobs = JobRegistry::new();
    for entry in &config.semaphores {
        jobs.register(entry.job.clone(), SleepJob::new(args.hold));
    }

    let report = match &args.wal {
        Some(path) => {
            let store = WalLockStore::open(path)
                .with_context(|| format!("opening WAL {}", path.display()))?;
            run_all(TracedLockStore::new(store), jobs, graph, workflow.entry(), args.executions)
                .await?
        }
        None => {
            let store = TracedLockStore::new(MemoryLockStore::new());
            run_all(store, jobs, graph, workflow.entry(), args.executions).await?
        }
    };

    output::print(&report, args.output)?;
    match report.failed() {
        0 => Ok(()),
        n => anyhow::bail!("{} of {} executions failed", n, args.executions),
    }
}

async fn run_all<S: LockStore>(
    store: S,
    jobs: JobRegistry,
    graph: StateGraph,
    start: StateId,
    executions: usize,
) -> Result<SimulationReport> {
    let runtime = Arc::new(Runtime::new(
        store.clone(),
        jobs,
        SystemClock,
        UuidIdGen::default(),
        RuntimeConfig::default(),
    ));
    let graph = Arc::new(graph);
    tracing::info!(executions, "starting simulation");

    let mut set = JoinSet::new();
    for index in 0..executions {
        let runtime = Arc::clone(&runtime);
        let graph = Arc::clone(&graph);
        set.spawn(async move {
            let result = runtime.start(&graph, start, serde_json::json!({})).await;
            (index, result)
        });
    }

    let mut lines = Vec::with_capacity(executions);
    while let Some(joined) = set.join_next().await {
        let (index, result) = joined.context("execution task panicked")?;
        let execution = result?;
        let (status, error) = match &execution.status {
            ExecutionStatus::Succeeded => ("succeeded", None),
            ExecutionStatus::Failed { error, cause } => {
                ("failed", Some(format!("{}: {}", error, cause)))
            }
        };
        lines.push((
            index,
            ExecutionLine {
                id: execution.id.clone(),
                status,
                error,
                states: execution.visited().len(),
            },
        ));
    }
    lines.sort_by_key(|(index, _)| *index);

    Ok(SimulationReport {
        executions: lines.into_iter().map(|(_, line)| line).collect(),
        records: RecordList(store.records().await?),
    })
}
