//! Leases bound holder lifetime; renewal extends it while work runs.

use dl_broker::MemoryBroker;
use dl_core::key::Bindings;
use dl_core::spec::LockSpec;
use dl_coordinator::LockCoordinator;
use std::time::Duration;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test]
async fn a_crashed_holder_frees_the_key_after_its_lease() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());

    // Acquire and walk away without releasing
    let _abandoned = coordinator
        .try_lock("job", Duration::ZERO, ms(250), false)
        .await
        .unwrap();

    // Not available before the lease lapses
    assert!(coordinator.try_lock("job", ms(50), ms(1000), false).await.is_none());

    // Available afterwards with no manual intervention
    let next = coordinator.try_lock("job", ms(2000), ms(1000), false).await;
    assert!(next.is_some());
}

#[tokio::test]
async fn auto_renewal_covers_work_longer_than_the_lease() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());
    let spec = LockSpec::new("job").with_lease_time(ms(200));

    let probe = coordinator.clone();
    coordinator
        .guard(&spec, &Bindings::new(), || async move {
            tokio::time::sleep(ms(600)).await;
            // Still exclusively held three lease-lengths in
            assert!(probe.try_lock("job", Duration::ZERO, ms(1000), false).await.is_none());
        })
        .await
        .unwrap();

    // And renewal stops with the guard
    assert!(!coordinator.is_locked("job").await);
}

#[tokio::test]
async fn renewal_can_be_opted_out_per_spec() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());
    let spec = LockSpec::new("job").with_lease_time(ms(150)).with_auto_renew(false);

    let probe = coordinator.clone();
    coordinator
        .guard(&spec, &Bindings::new(), || async move {
            // With renewal off the key is reclaimable mid-body
            assert!(probe.try_lock("job", ms(1000), ms(10_000), false).await.is_some());
        })
        .await
        .unwrap();
}
