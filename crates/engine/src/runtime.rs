// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime interpreting state graphs
//!
//! Each call to [`Runtime::run`] drives one execution from its start state to
//! a terminal state. Executions share nothing but the lock store, so any
//! number of them can run concurrently against one runtime.

use crate::error::RuntimeError;
use crate::executor::{Executor, TaskFailure};
use crate::history::{Execution, ExecutionStatus, HistoryEvent};
use crate::job::JobRegistry;
use gk_adapters::LockStore;
use gk_core::graph::{find_catcher, find_retrier, ParallelState, StateKind, TaskState};
use gk_core::{Clock, ExecutionContext, IdGen, StateGraph, StateId};
use serde_json::Value;
use tracing::Instrument;

/// Default bound on state entries per execution
pub const DEFAULT_MAX_TRANSITIONS: usize = 25_000;

/// Error name for a choice state where nothing matched
const NO_CHOICE_MATCHED: &str = "States.NoChoiceMatched";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of state entries before an execution is aborted
    pub max_transitions: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_transitions: DEFAULT_MAX_TRANSITIONS,
        }
    }
}

/// Runtime that runs executions of a graph
pub struct Runtime<S, C: Clock, I: IdGen> {
    executor: Executor<S>,
    clock: C,
    id_gen: I,
    config: RuntimeConfig,
}

impl<S, C, I> Runtime<S, C, I>
where
    S: LockStore,
    C: Clock,
    I: IdGen,
{
    pub fn new(store: S, jobs: JobRegistry, clock: C, id_gen: I, config: RuntimeConfig) -> Self {
        Self {
            executor: Executor::new(store, jobs),
            clock,
            id_gen,
            config,
        }
    }

    pub fn store(&self) -> &S {
        self.executor.store()
    }

    /// Run a new execution with a generated id
    pub async fn start(
        &self,
        graph: &StateGraph,
        start: StateId,
        input: Value,
    ) -> Result<Execution, RuntimeError> {
        let execution_id = self.id_gen.next();
        self.run(graph, start, execution_id, input).await
    }

    /// Run an execution with the given id
    pub async fn run(
        &self,
        graph: &StateGraph,
        start: StateId,
        execution_id: impl Into<String>,
        input: Value,
    ) -> Result<Execution, RuntimeError> {
        let execution_id = execution_id.into();
        let span = tracing::info_span!("execution", id = %execution_id);
        let mut run = ExecutionRun {
            id: execution_id,
            payload: input,
            history: Vec::new(),
        };
        async move {
            tracing::info!("starting");
            let started = self.clock.now();
            let status = self.drive(graph, start, &mut run).await?;
            let elapsed_ms = self.clock.now().duration_since(started).as_millis() as u64;
            match &status {
                ExecutionStatus::Succeeded => tracing::info!(elapsed_ms, "succeeded"),
                ExecutionStatus::Failed { error, cause } => {
                    tracing::warn!(elapsed_ms, error = %error, cause = %cause, "failed")
                }
            }
            Ok::<_, RuntimeError>(run.finish(status))
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &self,
        graph: &StateGraph,
        start: StateId,
        run: &mut ExecutionRun,
    ) -> Result<ExecutionStatus, RuntimeError> {
        let mut current = start;
        let mut transitions = 0;
        let mut scopes = Vec::new();

        loop {
            transitions += 1;
            if transitions > self.config.max_transitions {
                return Err(RuntimeError::TransitionLimit {
                    execution_id: run.id.clone(),
                    limit: self.config.max_transitions,
                });
            }

            let node = graph.state(current)?;
            tracing::debug!(state = %node.name, kind = node.kind.type_name(), "entered");
            run.history.push(HistoryEvent::StateEntered {
                state: node.name.clone(),
                input: run.payload.clone(),
            });

            let mut next = match &node.kind {
                StateKind::Task(task) => {
                    let ctx = ExecutionContext::new(run.id.clone(), self.clock.timestamp());
                    match self.attempt(&node.name, task, &ctx, run).await {
                        Ok(result) => {
                            run.apply(&task.result_path, result);
                            task.next
                        }
                        Err(failure) => match find_catcher(&task.catch, failure.error) {
                            Some(catcher) => {
                                let next_name = graph.state(catcher.next)?.name.clone();
                                tracing::debug!(error = %failure.error, next = %next_name, "caught");
                                run.history.push(HistoryEvent::TaskCaught {
                                    state: node.name.clone(),
                                    error: failure.error,
                                    next: next_name,
                                });
                                run.apply(&catcher.result_path, failure.to_json());
                                Some(catcher.next)
                            }
                            None => {
                                return Ok(ExecutionStatus::Failed {
                                    error: failure.error.to_string(),
                                    cause: failure.cause,
                                })
                            }
                        },
                    }
                }
                StateKind::Choice(choice) => {
                    let matched = choice
                        .branches
                        .iter()
                        .find(|branch| branch.rule.evaluate(&run.payload))
                        .map(|branch| branch.next)
                        .or(choice.default);
                    match matched {
                        Some(next) => Some(next),
                        None => {
                            return Ok(ExecutionStatus::Failed {
                                error: NO_CHOICE_MATCHED.to_string(),
                                cause: format!("no choice rule matched in {}", node.name),
                            })
                        }
                    }
                }
                StateKind::Pass(pass) => {
                    for path in &pass.clear {
                        path.remove(&mut run.payload);
                    }
                    pass.next
                }
                StateKind::Parallel(parallel) => {
                    scopes.push(Scope {
                        state: &node.name,
                        input: run.payload.clone(),
                        parallel,
                    });
                    Some(parallel.branch)
                }
                StateKind::Wait(wait) => {
                    tokio::time::sleep(wait.duration).await;
                    wait.next
                }
                StateKind::Succeed => None,
                StateKind::Fail { error, cause } => {
                    return Ok(ExecutionStatus::Failed {
                        error: error.clone(),
                        cause: cause.clone(),
                    })
                }
            };

            current = loop {
                if let Some(next) = next {
                    break next;
                }
                let Some(scope) = scopes.pop() else {
                    return Ok(ExecutionStatus::Succeeded);
                };
                tracing::debug!(state = %scope.state, "branch finished");
                let output = std::mem::take(&mut run.payload);
                run.payload = scope
                    .parallel
                    .result_path
                    .apply(scope.input, Value::Array(vec![output]));
                next = scope.parallel.next;
            };
        }
    }

    /// Run a task, retrying per its policy
    ///
    /// Each retrier keeps its own attempt count. The state-entered time in
    /// `ctx` is shared by every attempt.
    async fn attempt(
        &self,
        state: &str,
        task: &TaskState,
        ctx: &ExecutionContext,
        run: &mut ExecutionRun,
    ) -> Result<Value, TaskFailure> {
        let mut attempts = vec![0u32; task.retry.len()];
        loop {
            let failure = match self.executor.execute(&task.resource, ctx, &run.payload).await {
                Ok(result) => return Ok(result),
                Err(failure) => failure,
            };

            let Some((index, retrier)) = find_retrier(&task.retry, failure.error) else {
                return Err(failure);
            };
            let Some(attempt) = attempts.get_mut(index) else {
                return Err(failure);
            };
            if *attempt >= retrier.max_attempts {
                return Err(failure);
            }

            let delay = retrier.delay_for(*attempt);
            *attempt += 1;
            tracing::debug!(
                error = %failure.error,
                attempt = *attempt,
                delay_ms = delay.as_millis() as u64,
                "retrying"
            );
            run.history.push(HistoryEvent::TaskRetried {
                state: state.to_string(),
                error: failure.error,
                attempt: *attempt,
                delay,
            });
            tokio::time::sleep(delay).await;
        }
    }
}

/// A parallel state whose branch is running
struct Scope<'g> {
    state: &'g str,
    /// Payload as the parallel state was entered
    input: Value,
    parallel: &'g ParallelState,
}

/// Mutable state of one execution
struct ExecutionRun {
    id: String,
    payload: Value,
    history: Vec<HistoryEvent>,
}

impl ExecutionRun {
    fn apply(&mut self, result_path: &gk_core::ResultPath, result: Value) {
        let payload = std::mem::take(&mut self.payload);
        self.payload = result_path.apply(payload, result);
    }

    fn finish(self, status: ExecutionStatus) -> Execution {
        Execution {
            id: self.id,
            status,
            output: self.payload,
            history: self.history,
        }
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
