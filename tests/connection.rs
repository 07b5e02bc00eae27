// ABOUTME: Tests for the container cache and cluster view.
// ABOUTME: Memoization, idempotent population, and port binding parsing.

mod support;

use async_trait::async_trait;
use proptest::prelude::*;
use quayside::connection::{ConnectionError, ContainerCache, PortMappings};
use quayside::exec::{
    BaseInvoker, ComposeCommand, ComposeInvoker, Op, ProcessError, ProcessExecutor, ProcessOutput,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use support::ScriptedExecutor;
use tokio::sync::Notify;

fn cache(executor: &Arc<ScriptedExecutor>) -> ContainerCache {
    let invoker: Arc<dyn ComposeInvoker> = Arc::new(BaseInvoker::new(executor.clone()));
    ContainerCache::new(invoker, "127.0.0.1")
}

#[tokio::test]
async fn repeated_lookup_hits_the_cache() {
    let executor = Arc::new(ScriptedExecutor::new());
    executor.respond(Op::Ps, ProcessOutput::ok("db running\nweb running"));
    executor.respond(Op::Port, ProcessOutput::ok("5432/tcp -> 0.0.0.0:32768"));

    let cache = cache(&executor);
    let first = cache.container("db").await.expect("db should resolve");
    let second = cache.container("db").await.expect("db should resolve");

    assert_eq!(first, second);
    assert_eq!(executor.count(Op::Ps), 1);
    // One port resolution per listed service, none on the second lookup.
    assert_eq!(executor.count(Op::Port), 2);
}

#[tokio::test]
async fn resolved_container_carries_host_ip_and_ports() {
    let executor = Arc::new(ScriptedExecutor::new());
    executor.respond(Op::Ps, ProcessOutput::ok("db running"));
    executor.respond(Op::Port, ProcessOutput::ok("5432/tcp -> 0.0.0.0:32768"));

    let container = cache(&executor)
        .container("db")
        .await
        .expect("db should resolve");

    let port = container.port(5432).expect("binding should exist");
    assert_eq!(port.ip(), "127.0.0.1");
    assert_eq!(port.external(), 32768);
}

#[tokio::test]
async fn unknown_service_fails_after_a_fresh_listing() {
    let executor = Arc::new(ScriptedExecutor::new());
    executor.respond(Op::Ps, ProcessOutput::ok("db running"));

    let cache = cache(&executor);
    let err = cache
        .container("ghost")
        .await
        .expect_err("unknown service should fail");
    assert!(matches!(err, ConnectionError::UnknownService(name) if name == "ghost"));

    // A later miss re-queries rather than trusting the stale listing.
    let _ = cache.container("ghost").await;
    assert_eq!(executor.count(Op::Ps), 2);
}

#[tokio::test]
async fn concurrent_misses_share_one_population() {
    let executor = Arc::new(ScriptedExecutor::new());
    executor.respond(Op::Ps, ProcessOutput::ok("db running\nweb running"));

    let cache = cache(&executor);
    let (db, web) = tokio::join!(cache.container("db"), cache.container("web"));
    db.expect("db should resolve");
    web.expect("web should resolve");

    assert_eq!(executor.count(Op::Ps), 1);
}

/// Executor that can hold `ps` calls at a gate, to keep a cache
/// population in flight while the test pokes at the cache.
struct GatedPsExecutor {
    inner: ScriptedExecutor,
    hold_ps: AtomicBool,
    gate: Notify,
}

impl GatedPsExecutor {
    fn new() -> Self {
        Self {
            inner: ScriptedExecutor::new(),
            hold_ps: AtomicBool::new(false),
            gate: Notify::new(),
        }
    }
}

#[async_trait]
impl ProcessExecutor for GatedPsExecutor {
    async fn execute(&self, command: &ComposeCommand) -> Result<ProcessOutput, ProcessError> {
        if command.op == Op::Ps && self.hold_ps.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        self.inner.execute(command).await
    }
}

#[tokio::test]
async fn cache_hit_is_served_while_a_population_is_in_flight() {
    let executor = Arc::new(GatedPsExecutor::new());
    executor.inner.respond(Op::Ps, ProcessOutput::ok("db running"));

    let invoker: Arc<dyn ComposeInvoker> = Arc::new(BaseInvoker::new(executor.clone()));
    let cache = Arc::new(ContainerCache::new(invoker, "127.0.0.1"));
    cache.container("db").await.expect("db should resolve");

    // A miss for an unknown service now parks inside its listing call.
    executor.hold_ps.store(true, Ordering::SeqCst);
    let parked = tokio::spawn({
        let cache = cache.clone();
        async move {
            let _ = cache.container("ghost").await;
        }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let hit = tokio::time::timeout(Duration::from_secs(1), cache.container("db"))
        .await
        .expect("a cached lookup must not wait for the population");
    hit.expect("db should still resolve");

    executor.gate.notify_one();
    parked.await.unwrap();
}

#[tokio::test]
async fn cluster_ip_is_fixed_at_construction() {
    let executor = Arc::new(ScriptedExecutor::new());
    executor.respond(Op::Ps, ProcessOutput::ok("db running"));

    let cluster = support::test_cluster(executor);
    assert_eq!(cluster.ip(), "127.0.0.1");

    let container = cluster.container("db").await.expect("db should resolve");
    assert_eq!(container.name(), "db");
    assert_eq!(container.ip(), cluster.ip());
}

proptest! {
    #[test]
    fn parses_any_well_formed_binding_line(
        internal in 1u16..,
        external in 1u16..,
    ) {
        let line = format!("{internal}/tcp -> 0.0.0.0:{external}");
        let mappings = PortMappings::parse(&line).unwrap();
        prop_assert_eq!(mappings.internal(internal).unwrap().external, external);
    }
}
