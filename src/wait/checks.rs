// ABOUTME: Health check combinators and built-in checks.
// ABOUTME: Higher-order constructors producing new checks, no inheritance.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::marker::PhantomData;

use super::healthcheck::{HealthCheck, HealthCheckResult};
use crate::connection::{Cluster, Container, ContainerState, DockerPort};

/// Attach a human-readable label to a check. The label only shows up in
/// failure reporting.
pub fn named<C>(label: impl Into<String>, inner: C) -> Named<C> {
    Named {
        label: label.into(),
        inner,
    }
}

pub struct Named<C> {
    label: String,
    inner: C,
}

#[async_trait]
impl<T, C> HealthCheck<T> for Named<C>
where
    T: Send + Sync,
    C: HealthCheck<T>,
{
    async fn healthy(&self, target: &T) -> HealthCheckResult {
        self.inner.healthy(target).await
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Adapt a check over `B` into a check over `A` by mapping the target first.
pub fn transforming<A, B, F, C>(transform: F, inner: C) -> Transforming<F, C, B>
where
    F: Fn(&A) -> B + Send + Sync,
    C: HealthCheck<B>,
{
    Transforming {
        transform,
        inner,
        _target: PhantomData,
    }
}

pub struct Transforming<F, C, B> {
    transform: F,
    inner: C,
    _target: PhantomData<fn() -> B>,
}

#[async_trait]
impl<A, B, F, C> HealthCheck<A> for Transforming<F, C, B>
where
    A: Send + Sync,
    B: Send + Sync,
    F: Fn(&A) -> B + Send + Sync,
    C: HealthCheck<B>,
{
    async fn healthy(&self, target: &A) -> HealthCheckResult {
        let mapped = (self.transform)(target);
        self.inner.healthy(&mapped).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Run a container check against one named service of the cluster.
///
/// A service the project does not know is an error outcome, not a failure:
/// retrying cannot make a misconfigured name appear.
pub fn service<C>(service: impl Into<String>, inner: C) -> ServiceCheck<C>
where
    C: HealthCheck<Container>,
{
    let service = service.into();
    let label = format!("{} [{}]", inner.name(), service);
    ServiceCheck {
        service,
        label,
        inner,
    }
}

pub struct ServiceCheck<C> {
    service: String,
    label: String,
    inner: C,
}

#[async_trait]
impl<C> HealthCheck<Cluster> for ServiceCheck<C>
where
    C: HealthCheck<Container>,
{
    async fn healthy(&self, cluster: &Cluster) -> HealthCheckResult {
        match cluster.container(&self.service).await {
            Ok(container) => self.inner.healthy(&container).await,
            Err(e) => HealthCheckResult::error(format!(
                "could not resolve container for `{}`: {e}",
                self.service
            )),
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Run a container-list check against several named services at once.
pub fn services<C>(names: Vec<String>, inner: C) -> ServicesCheck<C>
where
    C: HealthCheck<Vec<Container>>,
{
    let label = format!("{} [{}]", inner.name(), names.join(", "));
    ServicesCheck {
        services: names,
        label,
        inner,
    }
}

pub struct ServicesCheck<C> {
    services: Vec<String>,
    label: String,
    inner: C,
}

#[async_trait]
impl<C> HealthCheck<Cluster> for ServicesCheck<C>
where
    C: HealthCheck<Vec<Container>>,
{
    async fn healthy(&self, cluster: &Cluster) -> HealthCheckResult {
        match cluster.containers(&self.services).await {
            Ok(containers) => self.inner.healthy(&containers).await,
            Err(e) => HealthCheckResult::error(format!("could not resolve containers: {e}")),
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Build a check from a plain closure.
pub fn from_fn<T, F>(f: F) -> FnCheck<F>
where
    T: Send + Sync,
    F: Fn(&T) -> HealthCheckResult + Send + Sync,
{
    FnCheck { f }
}

pub struct FnCheck<F> {
    f: F,
}

#[async_trait]
impl<T, F> HealthCheck<T> for FnCheck<F>
where
    T: Send + Sync,
    F: Fn(&T) -> HealthCheckResult + Send + Sync,
{
    async fn healthy(&self, target: &T) -> HealthCheckResult {
        (self.f)(target)
    }
}

/// Build a check from an async closure returning a boxed future.
pub fn from_async_fn<T, F>(f: F) -> AsyncFnCheck<F>
where
    T: Send + Sync,
    F: for<'a> Fn(&'a T) -> BoxFuture<'a, HealthCheckResult> + Send + Sync,
{
    AsyncFnCheck { f }
}

pub struct AsyncFnCheck<F> {
    f: F,
}

#[async_trait]
impl<T, F> HealthCheck<T> for AsyncFnCheck<F>
where
    T: Send + Sync,
    F: for<'a> Fn(&'a T) -> BoxFuture<'a, HealthCheckResult> + Send + Sync,
{
    async fn healthy(&self, target: &T) -> HealthCheckResult {
        (self.f)(target).await
    }
}

/// Baseline readiness: every container of the project is up, and any with a
/// health check reports healthy. An exited container can never recover, so
/// it aborts the wait.
pub fn native_cluster_check() -> NativeCheck {
    NativeCheck
}

pub struct NativeCheck;

#[async_trait]
impl HealthCheck<Cluster> for NativeCheck {
    async fn healthy(&self, cluster: &Cluster) -> HealthCheckResult {
        let states = match cluster.service_states().await {
            Ok(states) => states,
            // The listing can hiccup right after `up`; worth retrying.
            Err(e) => return HealthCheckResult::failure(format!("could not list containers: {e}")),
        };

        if states.is_empty() {
            return HealthCheckResult::failure("no containers are up yet");
        }

        let exited: Vec<&str> = states
            .iter()
            .filter(|s| s.state == ContainerState::Exited)
            .map(|s| s.service.as_str())
            .collect();
        if !exited.is_empty() {
            return HealthCheckResult::error(format!("containers exited: {}", exited.join(", ")));
        }

        let waiting: Vec<&str> = states
            .iter()
            .filter(|s| !s.state.is_ready())
            .map(|s| s.service.as_str())
            .collect();
        if waiting.is_empty() {
            HealthCheckResult::Success
        } else {
            HealthCheckResult::failure(format!("waiting for: {}", waiting.join(", ")))
        }
    }

    fn name(&self) -> &str {
        "native container state"
    }
}

/// A container check probing one internal port for a TCP listener.
pub fn port_listening(internal: u16) -> PortListening {
    PortListening { internal }
}

pub struct PortListening {
    internal: u16,
}

#[async_trait]
impl HealthCheck<Container> for PortListening {
    async fn healthy(&self, container: &Container) -> HealthCheckResult {
        let port = match container.port(self.internal) {
            Ok(port) => port,
            Err(e) => return HealthCheckResult::error(e.to_string()),
        };

        if port.is_listening().await {
            HealthCheckResult::Success
        } else {
            HealthCheckResult::failure(format!("nothing listening on {port}"))
        }
    }

    fn name(&self) -> &str {
        "port listening"
    }
}

/// A docker-port check probing for a TCP listener; pairs with
/// host-networked port waits.
pub fn open_port() -> OpenPort {
    OpenPort
}

pub struct OpenPort;

#[async_trait]
impl HealthCheck<DockerPort> for OpenPort {
    async fn healthy(&self, port: &DockerPort) -> HealthCheckResult {
        if port.is_listening().await {
            HealthCheckResult::Success
        } else {
            HealthCheckResult::failure(format!("nothing listening on {port}"))
        }
    }

    fn name(&self) -> &str {
        "open port"
    }
}
