// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chainable sub-graphs

use super::{GraphError, StateGraph, StateId};
use std::collections::HashSet;

/// One entry state and the exit states a successor gets attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    entry: StateId,
    exits: Vec<StateId>,
}

impl Fragment {
    pub fn new(entry: StateId, mut exits: Vec<StateId>) -> Result<Self, GraphError> {
        if exits.is_empty() {
            return Err(GraphError::EmptyExits);
        }
        let mut seen = HashSet::new();
        exits.retain(|exit| seen.insert(*exit));
        Ok(Self { entry, exits })
    }

    /// A single state that is both entry and exit
    pub fn single(state: StateId) -> Self {
        Self {
            entry: state,
            exits: vec![state],
        }
    }

    pub fn entry(&self) -> StateId {
        self.entry
    }

    pub fn exits(&self) -> &[StateId] {
        &self.exits
    }

    /// Chain `other` after every exit of this fragment
    pub fn next(self, graph: &mut StateGraph, other: Fragment) -> Result<Fragment, GraphError> {
        for exit in &self.exits {
            graph.check_connectable(*exit)?;
        }
        for exit in &self.exits {
            graph.connect(*exit, other.entry)?;
        }
        Ok(Fragment {
            entry: self.entry,
            exits: other.exits,
        })
    }
}
