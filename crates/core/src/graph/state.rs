// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State kinds

use super::choice::ChoiceRule;
use super::retry::{Catcher, Retrier};
use super::StateId;
use crate::lock::LockOperation;
use crate::payload::{JsonPath, ResultPath};
use std::time::Duration;

/// What a task state does when it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResource {
    /// A conditional operation against the lock table
    Lock(LockOperation),
    /// A caller-registered job, looked up by name at run time
    Job(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskState {
    pub resource: TaskResource,
    pub result_path: ResultPath,
    pub retry: Vec<Retrier>,
    pub catch: Vec<Catcher>,
    pub next: Option<StateId>,
}

impl TaskState {
    pub fn new(resource: TaskResource) -> Self {
        Self {
            resource,
            result_path: ResultPath::Replace,
            retry: Vec::new(),
            catch: Vec::new(),
            next: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceBranch {
    pub rule: ChoiceRule,
    pub next: StateId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChoiceState {
    pub branches: Vec<ChoiceBranch>,
    pub default: Option<StateId>,
}

/// Pass-through state, optionally dropping fields from the payload
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PassState {
    pub clear: Vec<JsonPath>,
    pub next: Option<StateId>,
}

/// Runs a branch on the state's input, then merges the branch output
///
/// The branch ends at the first state without a successor. Its output is
/// wrapped in a one-element array before `result_path` applies, so
/// `ResultPath::Discard` hands the original input to `next`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelState {
    pub branch: StateId,
    pub result_path: ResultPath,
    pub next: Option<StateId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaitState {
    pub duration: Duration,
    pub next: Option<StateId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StateKind {
    Task(TaskState),
    Choice(ChoiceState),
    Pass(PassState),
    Parallel(ParallelState),
    Wait(WaitState),
    Succeed,
    Fail { error: String, cause: String },
}

impl StateKind {
    /// A task running the named job
    pub fn job(name: impl Into<String>) -> Self {
        StateKind::Task(TaskState::new(TaskResource::Job(name.into())))
    }

    pub fn pass() -> Self {
        StateKind::Pass(PassState::default())
    }

    pub fn wait(duration: Duration) -> Self {
        StateKind::Wait(WaitState {
            duration,
            next: None,
        })
    }

    pub fn fail(error: impl Into<String>, cause: impl Into<String>) -> Self {
        StateKind::Fail {
            error: error.into(),
            cause: cause.into(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            StateKind::Task(_) => "Task",
            StateKind::Choice(_) => "Choice",
            StateKind::Pass(_) => "Pass",
            StateKind::Parallel(_) => "Parallel",
            StateKind::Wait(_) => "Wait",
            StateKind::Succeed => "Succeed",
            StateKind::Fail { .. } => "Fail",
        }
    }

    /// Successor for states that chain with `next`
    pub fn next(&self) -> Option<StateId> {
        match self {
            StateKind::Task(task) => task.next,
            StateKind::Pass(pass) => pass.next,
            StateKind::Parallel(parallel) => parallel.next,
            StateKind::Wait(wait) => wait.next,
            StateKind::Choice(_) | StateKind::Succeed | StateKind::Fail { .. } => None,
        }
    }

    /// Mutable successor slot, `None` for states that cannot chain
    pub(crate) fn next_slot(&mut self) -> Option<&mut Option<StateId>> {
        match self {
            StateKind::Task(task) => Some(&mut task.next),
            StateKind::Pass(pass) => Some(&mut pass.next),
            StateKind::Parallel(parallel) => Some(&mut parallel.next),
            StateKind::Wait(wait) => Some(&mut wait.next),
            StateKind::Choice(_) | StateKind::Succeed | StateKind::Fail { .. } => None,
        }
    }

    /// Every state this one can lead to, branch entries included
    pub fn successors(&self) -> Vec<StateId> {
        let mut out = self.transitions();
        if let StateKind::Parallel(parallel) = self {
            out.push(parallel.branch);
        }
        out
    }

    /// States this one can transition to within its own scope
    pub fn transitions(&self) -> Vec<StateId> {
        let mut out: Vec<StateId> = self.next().into_iter().collect();
        match self {
            StateKind::Task(task) => out.extend(task.catch.iter().map(|c| c.next)),
            StateKind::Choice(choice) => {
                out.extend(choice.branches.iter().map(|b| b.next));
                out.extend(choice.default);
            }
            _ => {}
        }
        out
    }
}
