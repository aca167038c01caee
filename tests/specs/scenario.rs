//! End-to-end scenarios mirroring application usage.

use dl_broker::fake::UnreachableBroker;
use dl_broker::MemoryBroker;
use dl_core::key::Bindings;
use dl_core::spec::LockSpec;
use dl_coordinator::{LockCoordinator, LockError};
use std::time::Duration;

/// Two concurrent QR-code exports for the same level: one renders, the
/// other is turned away with the operator-facing message.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn qrcode_generation_is_single_flight_per_level() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());
    let spec = LockSpec::new("qrcode:generate:#{#level}")
        .with_wait_time(Duration::from_millis(100))
        .with_lease_time(Duration::from_secs(10))
        .with_fail_message("系统繁忙，请稍后重试");
    let bindings = Bindings::new().bind("level", 3);

    let probe = coordinator.clone();
    let slow_spec = spec.clone();
    let slow_bindings = bindings.clone();
    let first = tokio::spawn(async move {
        probe
            .guard(&slow_spec, &slow_bindings, || async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                "rendered"
            })
            .await
    });
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Second export for the same level is rejected while the first runs
    let err = coordinator
        .guard(&spec, &bindings, || async { "rendered" })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "系统繁忙，请稍后重试");

    // A different level is untouched
    let other = Bindings::new().bind("level", 4);
    let out = coordinator
        .guard(&spec, &other, || async { "rendered" })
        .await
        .unwrap();
    assert_eq!(out, "rendered");

    assert_eq!(first.await.unwrap().unwrap(), "rendered");
    assert!(!coordinator.is_locked("qrcode:generate:3").await);
}

#[tokio::test]
async fn a_failing_body_propagates_its_error_and_releases() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());
    let spec = LockSpec::new("export:#{#report}");
    let bindings = Bindings::new().bind("report", "monthly");

    let out: Result<String, String> = coordinator
        .guard(&spec, &bindings, || async {
            Err("template not found".to_string())
        })
        .await
        .unwrap();

    assert_eq!(out.unwrap_err(), "template not found");
    // Whatever the body did, the next caller is not blocked
    assert!(coordinator
        .try_lock("export:monthly", Duration::ZERO, Duration::from_secs(1), false)
        .await
        .is_some());
}

#[tokio::test]
async fn a_bad_template_is_reported_as_a_key_error() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());
    let spec = LockSpec::new("order:#{#order.id()}");

    let err = coordinator
        .guard(&spec, &Bindings::new(), || async { unreachable!() })
        .await
        .unwrap_err();

    assert!(matches!(err, LockError::Key(_)));
    assert!(err.to_string().contains("#order.id()"));
}

#[tokio::test]
async fn structured_bindings_resolve_through_field_paths() {
    let coordinator = LockCoordinator::new(MemoryBroker::new());
    let spec = LockSpec::new("order:#{#order.id}:#{#order.region}");
    let bindings = Bindings::new().bind(
        "order",
        serde_json::json!({"id": 42, "region": "eu-west"}),
    );

    coordinator
        .guard(&spec, &bindings, || async {})
        .await
        .unwrap();

    assert!(coordinator
        .try_lock("order:42:eu-west", Duration::ZERO, Duration::from_secs(1), false)
        .await
        .is_some());
}

#[tokio::test]
async fn an_unreachable_broker_denies_rather_than_grants() {
    let coordinator = LockCoordinator::new(UnreachableBroker);
    let spec = LockSpec::new("k").with_fail_message("系统繁忙，请稍后重试");

    let err = coordinator
        .guard(&spec, &Bindings::new(), || async { unreachable!() })
        .await
        .unwrap_err();

    assert!(matches!(err, LockError::Acquisition { .. }));
    assert_eq!(err.to_string(), "系统繁忙，请稍后重试");
}
