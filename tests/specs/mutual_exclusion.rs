//! At most one guarded section per key at any instant.

use dl_broker::MemoryBroker;
use dl_core::key::Bindings;
use dl_core::spec::LockSpec;
use dl_coordinator::LockCoordinator;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_guards_never_overlap() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());
    let in_section = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let coordinator = coordinator.clone();
        let in_section = in_section.clone();
        let peak = peak.clone();
        tasks.push(tokio::spawn(async move {
            let spec = LockSpec::new("counter")
                .with_wait_time(Duration::from_secs(30))
                .with_lease_time(Duration::from_secs(10));
            coordinator
                .guard(&spec, &Bindings::new(), || async move {
                    let now = in_section.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    in_section.fetch_sub(1, Ordering::SeqCst);
                })
                .await
                .unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(peak.load(Ordering::SeqCst), 1, "two holders overlapped");
    assert!(!coordinator.is_locked("counter").await);
}

#[tokio::test]
async fn distinct_keys_do_not_contend() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());

    let a = coordinator
        .try_lock("order:1", Duration::ZERO, Duration::from_secs(10), false)
        .await;
    let b = coordinator
        .try_lock("order:2", Duration::ZERO, Duration::from_secs(10), false)
        .await;

    assert!(a.is_some());
    assert!(b.is_some());
}

#[tokio::test]
async fn a_stale_handle_cannot_release_the_next_holder() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());

    let first = coordinator
        .try_lock("k", Duration::ZERO, Duration::from_millis(150), false)
        .await
        .unwrap();

    // Lapse, then a new holder takes over
    tokio::time::sleep(Duration::from_millis(300)).await;
    let second = coordinator
        .try_lock("k", Duration::ZERO, Duration::from_secs(10), false)
        .await
        .unwrap();

    assert!(!coordinator.unlock(&first).await);
    assert!(coordinator.is_held(&second).await);
}
