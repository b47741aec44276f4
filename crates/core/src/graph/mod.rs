// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow state graphs
//!
//! A `StateGraph` is an arena of named states. Callers add their own states
//! for jobs and continuations, the semaphore assembler adds the protocol
//! states, and the orchestrator interprets the result starting from a
//! fragment's entry.

mod choice;
mod fragment;
mod render;
mod retry;
mod state;

pub use choice::{wildcard_match, ChoiceRule};
pub use fragment::Fragment;
pub use render::render_definition;
pub use retry::{find_catcher, find_retrier, Catcher, ErrorMatcher, ErrorName, Retrier};
pub use state::{
    ChoiceBranch, ChoiceState, ParallelState, PassState, StateKind, TaskResource, TaskState,
    WaitState,
};

use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

/// Handle to a state within one graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

impl StateId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Errors from building or chaining a graph
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("state name already used: {0}")]
    DuplicateName(String),
    #[error("unknown state id: {0}")]
    UnknownState(usize),
    #[error("state {0} cannot be chained with next")]
    NotNextable(String),
    #[error("state {0} already has a next state")]
    AlreadyConnected(String),
    #[error("a fragment needs at least one exit state")]
    EmptyExits,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateNode {
    pub name: String,
    pub comment: Option<String>,
    pub kind: StateKind,
}

#[derive(Debug, Clone, Default)]
pub struct StateGraph {
    states: Vec<StateNode>,
    index: HashMap<String, StateId>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state without a comment
    pub fn add(&mut self, name: impl Into<String>, kind: StateKind) -> Result<StateId, GraphError> {
        self.add_with_comment(name, kind, None)
    }

    pub fn add_with_comment(
        &mut self,
        name: impl Into<String>,
        kind: StateKind,
        comment: Option<String>,
    ) -> Result<StateId, GraphError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(GraphError::DuplicateName(name));
        }
        let id = StateId(self.states.len());
        self.index.insert(name.clone(), id);
        self.states.push(StateNode {
            name,
            comment,
            kind,
        });
        Ok(id)
    }

    pub fn get(&self, id: StateId) -> Option<&StateNode> {
        self.states.get(id.0)
    }

    pub fn state(&self, id: StateId) -> Result<&StateNode, GraphError> {
        self.get(id).ok_or(GraphError::UnknownState(id.0))
    }

    pub(crate) fn state_mut(&mut self, id: StateId) -> Result<&mut StateNode, GraphError> {
        self.states.get_mut(id.0).ok_or(GraphError::UnknownState(id.0))
    }

    pub fn find(&self, name: &str) -> Option<StateId> {
        self.index.get(name).copied()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &StateNode)> {
        self.states.iter().enumerate().map(|(i, s)| (StateId(i), s))
    }

    /// Check that `from` could be chained without modifying anything
    pub fn check_connectable(&self, from: StateId) -> Result<(), GraphError> {
        let node = self.state(from)?;
        match node.kind.next() {
            Some(_) => Err(GraphError::AlreadyConnected(node.name.clone())),
            None if matches!(
                node.kind,
                StateKind::Choice(_) | StateKind::Succeed | StateKind::Fail { .. }
            ) =>
            {
                Err(GraphError::NotNextable(node.name.clone()))
            }
            None => Ok(()),
        }
    }

    /// Set `to` as the successor of `from`
    ///
    /// A state is wired at most once; re-wiring is refused so that states
    /// inside a returned fragment cannot be redirected by the caller.
    pub fn connect(&mut self, from: StateId, to: StateId) -> Result<(), GraphError> {
        self.state(to)?;
        self.check_connectable(from)?;
        let node = self.state_mut(from)?;
        match node.kind.next_slot() {
            Some(slot) => {
                *slot = Some(to);
                Ok(())
            }
            None => Err(GraphError::NotNextable(node.name.clone())),
        }
    }

    /// States reachable from `start`, in breadth-first order
    ///
    /// Includes the states of every branch entered on the way.
    pub fn reachable_from(&self, start: StateId) -> Result<Vec<StateId>, GraphError> {
        self.walk(start, StateKind::successors)
    }

    /// States reachable from `start` without entering branches
    pub fn scope_of(&self, start: StateId) -> Result<Vec<StateId>, GraphError> {
        self.walk(start, StateKind::transitions)
    }

    fn walk(
        &self,
        start: StateId,
        edges: fn(&StateKind) -> Vec<StateId>,
    ) -> Result<Vec<StateId>, GraphError> {
        self.state(start)?;
        let mut seen = HashSet::from([start]);
        let mut order = Vec::new();
        let mut queue = VecDeque::from([start]);

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for next in edges(&self.state(id)?.kind) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        Ok(order)
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
