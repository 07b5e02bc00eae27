// ABOUTME: Tests for the readiness polling loop.
// ABOUTME: Covers retry-until-success, fatal errors, and timeouts.

mod support;

use futures::FutureExt;
use quayside::connection::{Cluster, Container, DockerPort, PortMapping, PortMappings};
use quayside::wait::{ClusterWait, HealthCheck, HealthCheckResult, POLL_INTERVAL, WaitError, checks};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::test(start_paused = true)]
async fn returns_once_check_succeeds() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let check = checks::named(
        "db ready",
        checks::from_fn(move |_: &Cluster| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                HealthCheckResult::failure("db not up")
            } else {
                HealthCheckResult::success()
            }
        }),
    );

    let wait = ClusterWait::new(check, Duration::from_secs(10));
    let started = tokio::time::Instant::now();
    wait.wait_until_ready(&support::test_cluster_default())
        .await
        .expect("wait should succeed");

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    // Two failed attempts mean two poll sleeps passed.
    assert!(started.elapsed() >= POLL_INTERVAL * 2);
}

#[tokio::test(start_paused = true)]
async fn error_aborts_immediately_without_retry() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let check = checks::named(
        "db ready",
        checks::from_fn(move |_: &Cluster| {
            counter.fetch_add(1, Ordering::SeqCst);
            HealthCheckResult::error("connection refused")
        }),
    );

    // Most of the budget remains; it must not matter.
    let wait = ClusterWait::new(check, Duration::from_secs(600));
    let started = tokio::time::Instant::now();
    let err = wait
        .wait_until_ready(&support::test_cluster_default())
        .await
        .expect_err("wait should abort");

    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(started.elapsed() < POLL_INTERVAL);
    match err {
        WaitError::Fatal { check, cause } => {
            assert_eq!(check, "db ready");
            assert_eq!(cause, "connection refused");
        }
        other => panic!("expected fatal error, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn timeout_carries_last_failure_and_check_name() {
    let check = checks::named(
        "postgres",
        checks::from_fn(|_: &Cluster| HealthCheckResult::failure("db not up")),
    );

    let wait = ClusterWait::new(check, Duration::from_millis(2000));
    let started = tokio::time::Instant::now();
    let err = wait
        .wait_until_ready(&support::test_cluster_default())
        .await
        .expect_err("wait should time out");

    assert!(started.elapsed() >= Duration::from_millis(2000));
    let message = err.to_string();
    assert!(message.contains("db not up"), "message: {message}");
    assert!(message.contains("postgres"), "message: {message}");
    assert!(matches!(err, WaitError::Timeout { .. }));
}

#[tokio::test(start_paused = true)]
async fn check_gets_at_least_one_attempt_with_zero_timeout() {
    let check = checks::from_fn(|_: &Cluster| HealthCheckResult::success());
    let wait = ClusterWait::new(check, Duration::ZERO);
    wait.wait_until_ready(&support::test_cluster_default())
        .await
        .expect("an immediately green check should pass");
}

fn container_bound_to(internal: u16, external: u16) -> Container {
    Container::new(
        "db",
        "127.0.0.1",
        PortMappings::new(vec![PortMapping {
            internal,
            external,
            bind_ip: "0.0.0.0".to_string(),
        }]),
    )
}

/// An ephemeral loopback port with nothing listening on it.
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[tokio::test]
async fn open_port_succeeds_against_a_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = DockerPort::host_networked("127.0.0.1", listener.local_addr().unwrap().port());

    assert!(checks::open_port().healthy(&port).await.succeeded());
}

#[tokio::test]
async fn open_port_fails_when_nothing_listens() {
    let port = DockerPort::host_networked("127.0.0.1", closed_port().await);

    let result = checks::open_port().healthy(&port).await;
    assert!(matches!(result, HealthCheckResult::Failure(_)));
}

#[tokio::test]
async fn port_listening_probes_the_external_binding() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let container = container_bound_to(5432, listener.local_addr().unwrap().port());

    let result = checks::port_listening(5432).healthy(&container).await;
    assert!(result.succeeded());
}

#[tokio::test]
async fn port_listening_fails_against_a_dead_binding() {
    let container = container_bound_to(5432, closed_port().await);

    let result = checks::port_listening(5432).healthy(&container).await;
    assert!(matches!(result, HealthCheckResult::Failure(_)));
}

#[tokio::test]
async fn port_listening_on_an_unmapped_port_is_fatal() {
    let container = container_bound_to(5432, 32768);

    // No retry can make a binding for port 80 appear.
    let result = checks::port_listening(80).healthy(&container).await;
    assert!(matches!(result, HealthCheckResult::Error(_)));
}

#[tokio::test(start_paused = true)]
async fn async_check_drives_the_polling_loop() {
    let check = checks::from_async_fn(|cluster: &Cluster| {
        let ip = cluster.ip().to_string();
        async move { HealthCheckResult::from_bool(ip == "127.0.0.1", "wrong ip") }.boxed()
    });

    let wait = ClusterWait::new(check, Duration::from_secs(1));
    wait.wait_until_ready(&support::test_cluster_default())
        .await
        .expect("async check should pass");
}

#[tokio::test(start_paused = true)]
async fn transforming_check_maps_the_target() {
    let check = checks::transforming(
        |cluster: &Cluster| cluster.ip().to_string(),
        checks::from_fn(|ip: &String| {
            HealthCheckResult::from_bool(ip.as_str() == "127.0.0.1", "wrong ip")
        }),
    );

    let wait = ClusterWait::new(check, Duration::from_secs(1));
    wait.wait_until_ready(&support::test_cluster_default())
        .await
        .expect("transformed check should pass");
}
