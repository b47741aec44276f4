// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gk render` - Print the assembled workflow definition

use super::load_workflow;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use gk_core::graph::render_definition;
use gk_core::LockTableSpec;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

#[derive(Args)]
pub struct RenderArgs {
    /// Workflow file (a single `life` semaphore when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Serialize)]
struct RenderedWorkflow {
    table: LockTableSpec,
    definition: Value,
    #[serde(skip)]
    states: Vec<(String, &'static str)>,
}

impl fmt::Display for RenderedWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Table: {} ({})", self.table.name, self.table.partition_key)?;
        if let Some(start) = self.definition.get("StartAt").and_then(Value::as_str) {
            writeln!(f, "StartAt: {}", start)?;
        }
        writeln!(f)?;
        writeln!(f, "{:<8} STATE", "TYPE")?;
        for (name, kind) in &self.states {
            writeln!(f, "{:<8} {}", kind, name)?;
        }
        Ok(())
    }
}

pub fn render(args: RenderArgs) -> Result<()> {
    let config = load_workflow(args.config.as_deref())?;
    let (graph, workflow, generator) = config.assemble()?;

    let mut states = Vec::new();
    for id in graph.reachable_from(workflow.entry())? {
        let node = graph.state(id)?;
        states.push((node.name.clone(), node.kind.type_name()));
    }
    let rendered = RenderedWorkflow {
        table: generator.table().clone(),
        definition: render_definition(&graph, workflow.entry())?,
        states,
    };
    output::print(&rendered, args.output)
}
