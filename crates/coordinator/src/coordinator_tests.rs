// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dl_broker::fake::UnreachableBroker;
use dl_broker::MemoryBroker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

#[tokio::test]
async fn try_lock_returns_handle_with_namespaced_key() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());

    let handle = coordinator
        .try_lock("order:42", Duration::ZERO, secs(10), false)
        .await
        .expect("free lock should be acquired");

    assert_eq!(handle.key(), "distributed:lock:order:42");
    assert!(coordinator.is_locked("order:42").await);
    assert!(coordinator.is_held(&handle).await);
}

#[tokio::test]
async fn second_acquisition_is_denied() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());

    let _held = coordinator
        .try_lock("k", Duration::ZERO, secs(10), false)
        .await
        .unwrap();
    let denied = coordinator
        .try_lock("k", Duration::from_millis(50), secs(10), false)
        .await;

    assert!(denied.is_none());
}

#[tokio::test]
async fn unlock_frees_the_key_for_the_next_caller() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());

    let handle = coordinator
        .try_lock("k", Duration::ZERO, secs(10), false)
        .await
        .unwrap();
    assert!(coordinator.unlock(&handle).await);

    assert!(!coordinator.is_locked("k").await);
    assert!(coordinator
        .try_lock("k", Duration::ZERO, secs(10), false)
        .await
        .is_some());
}

#[tokio::test]
async fn unlock_after_force_clear_is_a_quiet_noop() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());

    let stale = coordinator
        .try_lock("k", Duration::ZERO, secs(10), false)
        .await
        .unwrap();
    assert!(coordinator.force_unlock("k").await);

    // The key changed hands in between
    let current = coordinator
        .try_lock("k", Duration::ZERO, secs(10), false)
        .await
        .unwrap();

    assert!(!coordinator.unlock(&stale).await);
    assert!(coordinator.is_held(&current).await);
}

#[tokio::test]
async fn try_lock_or_fail_carries_the_configured_message() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());
    let _held = coordinator
        .try_lock("k", Duration::ZERO, secs(10), false)
        .await
        .unwrap();

    let err = coordinator
        .try_lock_or_fail("k", Duration::ZERO, secs(10), false, "export already running")
        .await
        .unwrap_err();

    assert!(matches!(err, LockError::Acquisition { .. }));
    assert_eq!(err.to_string(), "export already running");
}

#[tokio::test]
async fn unreachable_broker_fails_closed() {
    let coordinator = LockCoordinator::new(UnreachableBroker);

    assert!(coordinator
        .try_lock("k", Duration::ZERO, secs(10), false)
        .await
        .is_none());
    assert!(!coordinator.is_locked("k").await);
    assert!(!coordinator.force_unlock("k").await);
}

#[tokio::test]
async fn execute_with_lock_runs_body_and_releases() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());
    let ran = Arc::new(AtomicBool::new(false));

    let out = coordinator
        .execute_with_lock("k", Duration::ZERO, secs(10), false, || {
            let ran = ran.clone();
            let probe = coordinator.clone();
            async move {
                ran.store(true, Ordering::SeqCst);
                assert!(probe.is_locked("k").await);
                7
            }
        })
        .await
        .unwrap();

    assert_eq!(out, 7);
    assert!(ran.load(Ordering::SeqCst));
    assert!(!coordinator.is_locked("k").await);
}

#[tokio::test]
async fn execute_with_lock_denial_uses_default_message() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());
    let _held = coordinator
        .try_lock("k", Duration::ZERO, secs(10), false)
        .await
        .unwrap();

    let err = coordinator
        .execute_with_lock("k", Duration::ZERO, secs(10), false, || async {})
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), dl_core::spec::DEFAULT_FAIL_MESSAGE);
}

#[tokio::test]
async fn custom_prefix_flows_through_handles() {
    let config = CoordinatorConfig {
        key_prefix: "tenant:lock:".to_string(),
    };
    let coordinator = LockCoordinator::with_config(MemoryBroker::new(), config);

    let handle = coordinator
        .try_lock("k", Duration::ZERO, secs(10), false)
        .await
        .unwrap();

    assert_eq!(handle.key(), "tenant:lock:k");
}
