// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Render a graph as a States-Language style JSON definition

use super::{GraphError, StateGraph, StateId, StateKind, TaskResource};
use serde_json::{json, Map, Value};

/// Render every state reachable from `start`
///
/// States inside a parallel branch are rendered under that state's
/// `Branches`, not at the top level.
pub fn render_definition(graph: &StateGraph, start: StateId) -> Result<Value, GraphError> {
    let mut states = Map::new();
    for id in graph.scope_of(start)? {
        let node = graph.state(id)?;
        states.insert(node.name.clone(), render_state(graph, id)?);
    }
    Ok(json!({
        "StartAt": graph.state(start)?.name,
        "States": states,
    }))
}

fn name_of(graph: &StateGraph, id: StateId) -> Result<String, GraphError> {
    Ok(graph.state(id)?.name.clone())
}

fn render_state(graph: &StateGraph, id: StateId) -> Result<Value, GraphError> {
    let node = graph.state(id)?;
    let mut out = Map::new();
    out.insert("Type".into(), node.kind.type_name().into());
    if let Some(comment) = &node.comment {
        out.insert("Comment".into(), comment.clone().into());
    }

    match &node.kind {
        StateKind::Task(task) => {
            match &task.resource {
                TaskResource::Lock(op) => {
                    out.insert("Resource".into(), format!("lock:{}", op.name()).into());
                    out.insert("Parameters".into(), op.parameters());
                }
                TaskResource::Job(job) => {
                    out.insert("Resource".into(), format!("job:{}", job).into());
                }
            }
            out.insert("ResultPath".into(), task.result_path.to_json());
            if !task.retry.is_empty() {
                let retry: Vec<Value> = task
                    .retry
                    .iter()
                    .map(|r| {
                        json!({
                            "ErrorEquals": r.errors.to_json(),
                            "MaxAttempts": r.max_attempts,
                            "IntervalSeconds": r.interval.as_secs_f64(),
                            "BackoffRate": r.backoff_rate,
                        })
                    })
                    .collect();
                out.insert("Retry".into(), retry.into());
            }
            if !task.catch.is_empty() {
                let mut catch = Vec::new();
                for c in &task.catch {
                    catch.push(json!({
                        "ErrorEquals": c.errors.to_json(),
                        "Next": name_of(graph, c.next)?,
                        "ResultPath": c.result_path.to_json(),
                    }));
                }
                out.insert("Catch".into(), catch.into());
            }
        }
        StateKind::Choice(choice) => {
            let mut branches = Vec::new();
            for branch in &choice.branches {
                let mut rule = branch.rule.to_json();
                rule["Next"] = name_of(graph, branch.next)?.into();
                branches.push(rule);
            }
            out.insert("Choices".into(), branches.into());
            if let Some(default) = choice.default {
                out.insert("Default".into(), name_of(graph, default)?.into());
            }
        }
        StateKind::Pass(pass) => {
            if !pass.clear.is_empty() {
                let cleared: Vec<Value> = pass.clear.iter().map(|p| p.to_string().into()).collect();
                out.insert("Clear".into(), cleared.into());
            }
        }
        StateKind::Parallel(parallel) => {
            out.insert(
                "Branches".into(),
                json!([render_definition(graph, parallel.branch)?]),
            );
            out.insert("ResultPath".into(), parallel.result_path.to_json());
        }
        StateKind::Wait(wait) => {
            out.insert("Seconds".into(), wait.duration.as_secs_f64().into());
        }
        StateKind::Fail { error, cause } => {
            out.insert("Error".into(), error.clone().into());
            out.insert("Cause".into(), cause.clone().into());
        }
        StateKind::Succeed => {}
    }

    match &node.kind {
        StateKind::Task(_)
        | StateKind::Pass(_)
        | StateKind::Parallel(_)
        | StateKind::Wait(_) => match node.kind.next() {
            Some(next) => {
                out.insert("Next".into(), name_of(graph, next)?.into());
            }
            None => {
                out.insert("End".into(), true.into());
            }
        },
        _ => {}
    }

    Ok(Value::Object(out))
}
