// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Semaphore protocol assembly
//!
//! Wraps a caller's job fragment with the acquire/release protocol for a
//! counting semaphore stored in a single lock record. The resulting fragment
//! is wired as:
//!
//! ```text
//! Get Lock ──▶ job ──▶ Release ──▶ continuation
//!  └ branch:
//!    Acquire ──ok──▶ Enter
//!      │  ▲  ▲          ▲
//!      │  │  └── Wait ◀─┼── Check ◀── Get Current ◀── (condition failed)
//!      │  │             └── Continue (already held)
//!      │  └── Initialize ◀── (record missing)
//! ```
//!
//! The acquire branch works on a copy of the payload that is dropped when
//! it ends, so the job receives the fragment's input unchanged.

use super::registry::LockRegistry;
use super::table::LockTableSpec;
use crate::graph::{
    Catcher, ChoiceBranch, ChoiceRule, ChoiceState, ErrorMatcher, ErrorName, Fragment,
    GraphError, ParallelState, PassState, Retrier, StateGraph, StateId, StateKind, TaskResource,
    TaskState, WaitState,
};
use crate::lock::{LockOperation, HELD_SINCE_FIELD, ITEM_STRING_FIELD};
use crate::payload::{JsonPath, ResultPath};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Payload field holding everything the protocol writes
pub const LOCKINFO: &str = "lockinfo";
/// Result of the acquire update
pub const ACQUIRE_RESULT: &str = "acquirelock";
/// Result of reading the current record
pub const CURRENT_ITEM: &str = "currentlockitem";
/// Error caught from acquire or release
pub const ACQUISITION_ERROR: &str = "acquisitionerror";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Attempts for unclassified acquire failures, including condition failures
const ACQUIRE_MAX_ATTEMPTS: u32 = 6;
const ACQUIRE_BACKOFF_RATE: f64 = 2.0;
const RELEASE_MAX_ATTEMPTS: u32 = 5;
const RELEASE_BACKOFF_RATE: f64 = 1.5;

/// Pattern matching a rendered item whose last attribute is a UTC timestamp
const TIMESTAMP_SUFFIX_PATTERN: &str = "*Z\"}";

/// Path `$.lockinfo`
pub fn lockinfo_path() -> JsonPath {
    JsonPath::from_segments([LOCKINFO])
}

/// Path `$.lockinfo.<field>`
pub fn lockinfo_field(field: &str) -> JsonPath {
    lockinfo_path().child(field)
}

/// Errors from assembling a semaphored job
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SemaphoreError {
    #[error("lock name must not be empty")]
    InvalidLockName,
    #[error("limit for lock '{lock_name}' must be positive")]
    InvalidLimit { lock_name: String },
    #[error(
        "lock '{lock_name}' was already defined with limit {previous}, cannot redefine it with limit {given}"
    )]
    LockRedefined {
        lock_name: String,
        given: u32,
        previous: u32,
    },
    #[error("lock '{lock_name}' is already in use; pass reuse_lock to share it between jobs")]
    LockReuseNotAllowed { lock_name: String },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// How the protocol decides that an execution already holds its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerDetection {
    /// The fetched item carries this execution's acquisition time
    #[default]
    Structural,
    /// The rendered item ends in a UTC timestamp
    TimestampSuffix,
}

impl MarkerDetection {
    fn rule(self) -> ChoiceRule {
        let item = lockinfo_field(CURRENT_ITEM);
        match self {
            MarkerDetection::Structural => ChoiceRule::IsPresent(item.child(HELD_SINCE_FIELD)),
            MarkerDetection::TimestampSuffix => {
                let rendered = item.child(ITEM_STRING_FIELD);
                ChoiceRule::And(vec![
                    ChoiceRule::IsPresent(rendered.clone()),
                    ChoiceRule::StringMatches {
                        path: rendered,
                        pattern: TIMESTAMP_SUFFIX_PATTERN.to_string(),
                    },
                ])
            }
        }
    }
}

/// A job to protect and the state to continue with afterwards
#[derive(Debug, Clone)]
pub struct SemaphoreRequest {
    pub lock_name: String,
    pub limit: u32,
    pub job: Fragment,
    pub next_state: Fragment,
    pub reuse_lock: bool,
    pub comments: bool,
}

impl SemaphoreRequest {
    pub fn new(lock_name: impl Into<String>, limit: u32, job: Fragment, next_state: Fragment) -> Self {
        Self {
            lock_name: lock_name.into(),
            limit,
            job,
            next_state,
            reuse_lock: false,
            comments: false,
        }
    }

    pub fn with_reuse_lock(mut self, reuse_lock: bool) -> Self {
        self.reuse_lock = reuse_lock;
        self
    }

    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }
}

/// Names of the states built for one use of a lock
struct StateNames {
    get_lock: String,
    acquire: String,
    initialize: String,
    fetch: String,
    check: String,
    continue_held: String,
    wait: String,
    enter: String,
    release: String,
}

impl StateNames {
    fn new(lock_name: &str, times_used: u32) -> Self {
        let n = times_used;
        Self {
            get_lock: format!("Get {lock_name} Lock: {n}"),
            acquire: format!("Acquire {lock_name} Lock: {n}"),
            initialize: format!("Initialize {lock_name} Lock Item: {n}"),
            fetch: format!("Get Current {lock_name} Lock Record: {n}"),
            check: format!("Check if {lock_name} Lock Already Acquired: {n}"),
            continue_held: format!("Continue Because {lock_name} Lock Was Already Acquired: {n}"),
            wait: format!("Wait to Get {lock_name} Lock: {n}"),
            enter: format!("Enter {lock_name} Protected Job: {n}"),
            release: format!("Release {lock_name} Lock: {n}"),
        }
    }

    fn all(&self) -> [&str; 9] {
        [
            self.get_lock.as_str(),
            self.acquire.as_str(),
            self.initialize.as_str(),
            self.fetch.as_str(),
            self.check.as_str(),
            self.continue_held.as_str(),
            self.wait.as_str(),
            self.enter.as_str(),
            self.release.as_str(),
        ]
    }
}

/// Builds semaphore-protected fragments against one lock table
///
/// Owns the lock registry for its scope, so lock names are checked for
/// consistent limits across every fragment it builds.
#[derive(Debug, Clone)]
pub struct SemaphoreGenerator {
    table: LockTableSpec,
    registry: LockRegistry,
    poll_interval: Duration,
    marker_detection: MarkerDetection,
}

impl Default for SemaphoreGenerator {
    fn default() -> Self {
        Self::new(LockTableSpec::default())
    }
}

impl SemaphoreGenerator {
    pub fn new(table: LockTableSpec) -> Self {
        Self {
            table,
            registry: LockRegistry::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            marker_detection: MarkerDetection::default(),
        }
    }

    /// Delay between polls while the lock is full
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_marker_detection(mut self, marker_detection: MarkerDetection) -> Self {
        self.marker_detection = marker_detection;
        self
    }

    pub fn table(&self) -> &LockTableSpec {
        &self.table
    }

    pub fn registry(&self) -> &LockRegistry {
        &self.registry
    }

    /// Wrap `request.job` with acquire/release states for `request.lock_name`
    ///
    /// Returns a fragment entered at the `Get … Lock` state, whose branch
    /// starts at the acquire state, with the exits of `request.next_state`. On error neither the graph nor the registry
    /// is modified.
    pub fn generate_semaphored_job(
        &mut self,
        graph: &mut StateGraph,
        request: SemaphoreRequest,
    ) -> Result<Fragment, SemaphoreError> {
        let SemaphoreRequest {
            lock_name,
            limit,
            job,
            next_state,
            reuse_lock,
            comments,
        } = request;

        if lock_name.trim().is_empty() {
            return Err(SemaphoreError::InvalidLockName);
        }
        if limit == 0 {
            return Err(SemaphoreError::InvalidLimit { lock_name });
        }

        let mut registry = self.registry.clone();
        let times_used = registry.register(&lock_name, limit, reuse_lock)?;
        let names = StateNames::new(&lock_name, times_used);

        if let Some(taken) = names.all().into_iter().find(|name| graph.contains_name(name)) {
            return Err(GraphError::DuplicateName(taken.to_string()).into());
        }
        graph.state(job.entry())?;
        graph.state(next_state.entry())?;
        for exit in job.exits() {
            graph.check_connectable(*exit)?;
        }

        self.registry = registry;
        let note = |text: String| comments.then_some(text);
        let table = self.table.name.clone();
        let error_path = ResultPath::at(lockinfo_field(ACQUISITION_ERROR));

        let enter = graph.add_with_comment(
            &names.enter,
            StateKind::pass(),
            note(format!(
                "A {lock_name} slot is held, so the job can start"
            )),
        )?;
        let continue_held = graph.add_with_comment(
            &names.continue_held,
            StateKind::Pass(PassState {
                clear: Vec::new(),
                next: Some(enter),
            }),
            note(format!(
                "This execution already holds a {lock_name} slot, so run the job without acquiring again"
            )),
        )?;

        let mut acquire = TaskState::new(TaskResource::Lock(LockOperation::Acquire {
            table: table.clone(),
            lock_name: lock_name.clone(),
            limit,
        }));
        acquire.result_path = ResultPath::at(lockinfo_field(ACQUIRE_RESULT));
        acquire.retry = vec![
            Retrier::new(ErrorMatcher::only(ErrorName::NotFound)).with_max_attempts(0),
            Retrier::new(ErrorMatcher::All)
                .with_max_attempts(ACQUIRE_MAX_ATTEMPTS)
                .with_backoff_rate(ACQUIRE_BACKOFF_RATE),
        ];
        acquire.next = Some(enter);
        let acquire = graph.add_with_comment(
            &names.acquire,
            StateKind::Task(acquire),
            note(format!(
                "Take a {lock_name} slot if fewer than {limit} are held and this execution holds none"
            )),
        )?;

        let mut initialize = TaskState::new(TaskResource::Lock(LockOperation::Initialize {
            table: table.clone(),
            lock_name: lock_name.clone(),
        }));
        initialize.result_path = ResultPath::Discard;
        initialize.catch = vec![Catcher::new(ErrorMatcher::All, acquire, ResultPath::Discard)];
        initialize.next = Some(acquire);
        let initialize = graph.add_with_comment(
            &names.initialize,
            StateKind::Task(initialize),
            note(format!(
                "Create the {lock_name} record with a zero count; losing the race to another execution is fine"
            )),
        )?;

        let wait = graph.add_with_comment(
            &names.wait,
            StateKind::Wait(WaitState {
                duration: self.poll_interval,
                next: Some(acquire),
            }),
            note(format!("All {limit} {lock_name} slots are taken; wait before trying again")),
        )?;
        let check = graph.add_with_comment(
            &names.check,
            StateKind::Choice(ChoiceState {
                branches: vec![ChoiceBranch {
                    rule: self.marker_detection.rule(),
                    next: continue_held,
                }],
                default: Some(wait),
            }),
            note(format!(
                "Acquiring can fail because this execution already holds a {lock_name} slot"
            )),
        )?;

        let mut fetch = TaskState::new(TaskResource::Lock(LockOperation::FetchOwner {
            table: table.clone(),
            lock_name: lock_name.clone(),
        }));
        fetch.result_path = ResultPath::at(lockinfo_field(CURRENT_ITEM));
        fetch.next = Some(check);
        let fetch = graph.add_with_comment(
            &names.fetch,
            StateKind::Task(fetch),
            note(format!("Read this execution's marker from the {lock_name} record")),
        )?;

        set_catchers(
            graph,
            acquire,
            vec![
                Catcher::new(
                    ErrorMatcher::only(ErrorName::NotFound),
                    initialize,
                    error_path.clone(),
                ),
                Catcher::new(
                    ErrorMatcher::only(ErrorName::ConditionFailed),
                    fetch,
                    error_path.clone(),
                ),
            ],
        )?;

        let get_lock = graph.add_with_comment(
            &names.get_lock,
            StateKind::Parallel(ParallelState {
                branch: acquire,
                result_path: ResultPath::Discard,
                next: Some(job.entry()),
            }),
            note(format!(
                "Hold a {lock_name} slot, then run the job on this state's input"
            )),
        )?;

        let mut release = TaskState::new(TaskResource::Lock(LockOperation::Release {
            table,
            lock_name: lock_name.clone(),
        }));
        release.result_path = ResultPath::Discard;
        release.retry = vec![
            Retrier::new(ErrorMatcher::only(ErrorName::ConditionFailed)).with_max_attempts(0),
            Retrier::new(ErrorMatcher::All)
                .with_max_attempts(RELEASE_MAX_ATTEMPTS)
                .with_backoff_rate(RELEASE_BACKOFF_RATE),
        ];
        release.catch = vec![Catcher::new(
            ErrorMatcher::only(ErrorName::ConditionFailed),
            next_state.entry(),
            error_path,
        )];
        release.next = Some(next_state.entry());
        let release = graph.add_with_comment(
            &names.release,
            StateKind::Task(release),
            note(format!("Give back the {lock_name} slot held by this execution")),
        )?;

        for exit in job.exits() {
            graph.connect(*exit, release)?;
        }

        Ok(Fragment::new(get_lock, next_state.exits().to_vec())?)
    }
}

fn set_catchers(
    graph: &mut StateGraph,
    id: StateId,
    catchers: Vec<Catcher>,
) -> Result<(), GraphError> {
    let node = graph.state_mut(id)?;
    if let StateKind::Task(task) = &mut node.kind {
        task.catch = catchers;
    }
    Ok(())
}

#[cfg(test)]
#[path = "semaphore_tests.rs"]
mod tests;
