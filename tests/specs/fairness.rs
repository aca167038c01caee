//! Fair locks serve waiters in arrival order.

use dl_broker::MemoryBroker;
use dl_core::key::Bindings;
use dl_core::spec::LockSpec;
use dl_coordinator::LockCoordinator;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fair_guards_run_in_arrival_order() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());
    let holder = coordinator
        .try_lock("queue", Duration::ZERO, Duration::from_secs(30), false)
        .await
        .unwrap();

    let order = Arc::new(Mutex::new(Vec::new()));
    let mut tasks = Vec::new();
    for i in 0..4u32 {
        let coordinator = coordinator.clone();
        let order = order.clone();
        tasks.push(tokio::spawn(async move {
            let spec = LockSpec::new("queue")
                .with_fair(true)
                .with_wait_time(Duration::from_secs(30));
            coordinator
                .guard(&spec, &Bindings::new(), || async move {
                    order.lock().unwrap().push(i);
                })
                .await
                .unwrap();
        }));
        // Stagger arrivals so queue positions are deterministic
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    coordinator.unlock(&holder).await;
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn non_fair_guard_still_respects_the_current_holder() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());
    let _holder = coordinator
        .try_lock("queue", Duration::ZERO, Duration::from_secs(30), false)
        .await
        .unwrap();

    let spec = LockSpec::new("queue").with_wait_time(Duration::from_millis(50));
    let err = coordinator
        .guard(&spec, &Bindings::new(), || async { unreachable!() })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "lock busy, try again shortly");
}
