// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[test]
fn first_registration_returns_one() {
    let mut registry = LockRegistry::new();
    assert_eq!(registry.register("life", 42, false).unwrap(), 1);
    assert_eq!(
        registry.get("life"),
        Some(&UsageTracker {
            limit: 42,
            times_used: 1
        })
    );
}

#[test]
fn reuse_with_same_limit_counts_up() {
    let mut registry = LockRegistry::new();
    assert_eq!(registry.register("life", 42, false).unwrap(), 1);
    assert_eq!(registry.register("life", 42, true).unwrap(), 2);
    assert_eq!(registry.register("life", 42, true).unwrap(), 3);
    assert_eq!(registry.len(), 1);
}

#[test]
fn reuse_without_opt_in_fails() {
    let mut registry = LockRegistry::new();
    registry.register("life", 42, false).unwrap();

    let err = registry.register("life", 42, false).unwrap_err();
    assert!(matches!(err, SemaphoreError::LockReuseNotAllowed { ref lock_name } if lock_name == "life"));
    assert_eq!(registry.get("life").map(|t| t.times_used), Some(1));
}

#[test]
fn different_limit_fails_regardless_of_reuse() {
    for reuse in [false, true] {
        let mut registry = LockRegistry::new();
        registry.register("life", 42, false).unwrap();

        let err = registry.register("life", 7, reuse).unwrap_err();
        assert!(matches!(
            err,
            SemaphoreError::LockRedefined { given: 7, previous: 42, .. }
        ));
        assert_eq!(registry.get("life").map(|t| t.limit), Some(42));
    }
}

#[test]
fn separate_registries_do_not_share_state() {
    let mut first = LockRegistry::new();
    let mut second = LockRegistry::new();
    first.register("life", 1, false).unwrap();
    assert_eq!(second.register("life", 2, false).unwrap(), 1);
}

proptest! {
    #[test]
    fn times_used_matches_successful_reuses(uses in 1u32..20) {
        let mut registry = LockRegistry::new();
        for expected in 1..=uses {
            prop_assert_eq!(registry.register("lock", 3, true).unwrap(), expected);
        }
        prop_assert_eq!(registry.get("lock").map(|t| t.times_used), Some(uses));
    }

    #[test]
    fn limit_never_changes(limits in proptest::collection::vec(1u32..5, 1..10)) {
        let mut registry = LockRegistry::new();
        let first = limits[0];
        for limit in &limits {
            let _ = registry.register("lock", *limit, true);
        }
        prop_assert_eq!(registry.get("lock").map(|t| t.limit), Some(first));
    }
}
