//! Behavioral tests for gatekeep
//!
//! These drive assembled workflows through the reference runtime against
//! real and fake lock stores, and check what the lock table looks like
//! afterwards.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "behavior/prelude.rs"]
mod prelude;

// protocol/
#[path = "behavior/protocol/life.rs"]
mod protocol_life;
#[path = "behavior/protocol/reentrancy.rs"]
mod protocol_reentrancy;
#[path = "behavior/protocol/release.rs"]
mod protocol_release;
#[path = "behavior/protocol/safety.rs"]
mod protocol_safety;

// store/
#[path = "behavior/store/failures.rs"]
mod store_failures;
#[path = "behavior/store/wal.rs"]
mod store_wal;

// workflow/
#[path = "behavior/workflow/chained.rs"]
mod workflow_chained;
