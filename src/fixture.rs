// ABOUTME: The fixture orchestrator: start, wait, exec, stop, report.
// ABOUTME: Composes the pipeline, waits, shutdown strategy, and stats.

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::{DEFAULT_READINESS_TIMEOUT, DEFAULT_RETRY_ATTEMPTS, FixtureOptions};
use crate::connection::{Cluster, Container, ContainerCache, DockerPort};
use crate::error::FixtureError;
use crate::exec::{
    BaseInvoker, ComposeInvoker, ConflictRemovingInvoker, ExecOptions, ProcessError,
    ProcessExecutor, RetryingInvoker, RunOptions, ShellExecutor,
};
use crate::logs::{LogCollector, NoOpLogCollector};
use crate::shutdown::ShutdownStrategy;
use crate::stats::{RunStats, StatsConsumer, StatsRecorder};
use crate::types::{ProjectName, ProjectNameError};
use crate::wait::{ClusterWait, HealthCheck, HealthCheckResult, checks};

/// Timings captured by a completed `start()`. Their presence is the record
/// that a start attempt completed, checked before stats assembly in `stop()`.
struct StartTimings {
    startup: Duration,
    readiness: Duration,
}

/// A multi-container test environment managed through the external compose
/// tool. The test-lifecycle driver calls [`start`](ComposeFixture::start)
/// before the test body and [`stop`](ComposeFixture::stop) after, regardless
/// of test outcome.
pub struct ComposeFixture {
    project: ProjectName,
    ip: String,
    invoker: Arc<dyn ComposeInvoker>,
    cluster: Cluster,
    pull_on_startup: bool,
    native_timeout: Duration,
    waits: Vec<ClusterWait>,
    shutdown_strategy: ShutdownStrategy,
    stats_recorder: Arc<StatsRecorder>,
    consumers: Vec<Box<dyn StatsConsumer>>,
    log_collector: Box<dyn LogCollector>,
    start_timings: Option<StartTimings>,
}

impl ComposeFixture {
    pub fn builder() -> ComposeFixtureBuilder {
        ComposeFixtureBuilder::new()
    }

    pub fn project(&self) -> &ProjectName {
        &self.project
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    /// A port on the host network, reachable at the cluster IP.
    pub fn host_networked_port(&self, port: u16) -> DockerPort {
        DockerPort::host_networked(self.ip.clone(), port)
    }

    /// Bring the cluster up and wait until it is operationally ready.
    ///
    /// Any failure propagates to the caller, aborting the fixture before a
    /// test runs. `stop()` must still be invoked afterwards.
    pub async fn start(&mut self) -> Result<(), FixtureError> {
        info!(project = %self.project, "starting compose cluster");

        let phase = Instant::now();
        self.pull_build_up()
            .await
            .map_err(|source| FixtureError::Startup { source })?;
        let startup = phase.elapsed();

        self.log_collector
            .start_collecting(&self.cluster)
            .await
            .map_err(|source| FixtureError::LogCollection { source })?;

        let phase = Instant::now();
        self.wait_for_services().await?;
        let readiness = phase.elapsed();

        info!(project = %self.project, ?startup, ?readiness, "compose cluster started");
        self.start_timings = Some(StartTimings { startup, readiness });
        Ok(())
    }

    async fn pull_build_up(&self) -> Result<(), ProcessError> {
        if self.pull_on_startup {
            self.invoker.pull().await?;
        }
        self.invoker.build().await?;
        self.invoker.up().await
    }

    async fn wait_for_services(&self) -> Result<(), FixtureError> {
        debug!("waiting for services");

        // Baseline readiness first, then declared waits in order. The first
        // failure aborts the remaining waits.
        ClusterWait::new(checks::native_cluster_check(), self.native_timeout)
            .wait_until_ready(&self.cluster)
            .await?;
        for wait in &self.waits {
            wait.wait_until_ready(&self.cluster).await?;
        }

        debug!(services = ?self.stats_recorder.results(), "all services ready");
        Ok(())
    }

    /// Tear the cluster down and dispatch the run's stats.
    ///
    /// Stats are assembled only if a start attempt completed, and they are
    /// dispatched best-effort before a shutdown failure escalates, so
    /// diagnostics survive a broken teardown.
    pub async fn stop(&mut self) -> Result<(), FixtureError> {
        let shutdown_result = self.shutdown_strategy.shutdown(self.invoker.as_ref()).await;

        if let Err(e) = self.log_collector.stop_collecting().await {
            warn!(error = %e, "failed to stop log collection");
        }

        if let Some(timings) = self.start_timings.take() {
            let (shutdown, shutdown_error) = match &shutdown_result {
                Ok(elapsed) => (Some(*elapsed), None),
                Err(e) => (None, Some(e.to_string())),
            };
            let stats = RunStats {
                recorded_at: Utc::now(),
                startup: timings.startup,
                readiness: timings.readiness,
                services: self.stats_recorder.results(),
                shutdown,
                shutdown_error,
            };
            self.dispatch_stats(&stats);
        }

        shutdown_result
            .map(|_| ())
            .map_err(|source| FixtureError::Teardown { source })
    }

    fn dispatch_stats(&self, stats: &RunStats) {
        for consumer in &self.consumers {
            if let Err(e) = consumer.consume(stats) {
                error!(consumer = consumer.name(), error = %e, "stats consumer failed");
            }
        }
    }

    /// Run a command inside a running container. Same failure contract as
    /// the pipeline's base operations.
    pub async fn exec(
        &self,
        options: &ExecOptions,
        service: &str,
        args: &[String],
    ) -> Result<String, ProcessError> {
        self.invoker.exec(options, service, args).await
    }

    /// Run a one-off container for a service.
    pub async fn run(
        &self,
        options: &RunOptions,
        service: &str,
        args: &[String],
    ) -> Result<String, ProcessError> {
        self.invoker.run(options, service, args).await
    }
}

/// Stops the per-service timers when the wrapped check first succeeds.
struct TimedCheck<C> {
    recorder: Arc<StatsRecorder>,
    services: Vec<String>,
    inner: C,
}

#[async_trait]
impl<T, C> HealthCheck<T> for TimedCheck<C>
where
    T: Send + Sync,
    C: HealthCheck<T>,
{
    async fn healthy(&self, target: &T) -> HealthCheckResult {
        let timers: Vec<_> = self
            .services
            .iter()
            .map(|s| self.recorder.for_service(s))
            .collect();

        let result = self.inner.healthy(target).await;

        if result.succeeded() {
            for timer in timers {
                timer.stop();
            }
        }
        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Builder assembling a [`ComposeFixture`].
pub struct ComposeFixtureBuilder {
    files: Vec<PathBuf>,
    project: Option<ProjectName>,
    ip: String,
    executor: Option<Arc<dyn ProcessExecutor>>,
    shutdown_strategy: ShutdownStrategy,
    retry_attempts: u32,
    pull_on_startup: bool,
    remove_conflicting_containers: bool,
    native_timeout: Duration,
    waits: Vec<ClusterWait>,
    consumers: Vec<Box<dyn StatsConsumer>>,
    log_collector: Option<Box<dyn LogCollector>>,
    stats_recorder: Arc<StatsRecorder>,
}

impl Default for ComposeFixtureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposeFixtureBuilder {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            project: None,
            ip: "127.0.0.1".to_string(),
            executor: None,
            shutdown_strategy: ShutdownStrategy::default(),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            pull_on_startup: false,
            remove_conflicting_containers: true,
            native_timeout: DEFAULT_READINESS_TIMEOUT,
            waits: Vec::new(),
            consumers: Vec::new(),
            log_collector: None,
            stats_recorder: Arc::new(StatsRecorder::new()),
        }
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn project_name(mut self, project: ProjectName) -> Self {
        self.project = Some(project);
        self
    }

    /// IP of the machine running the containers. Defaults to loopback.
    pub fn machine_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    /// Replace the default shell executor, e.g. with a test double.
    pub fn executor(mut self, executor: Arc<dyn ProcessExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn shutdown_strategy(mut self, strategy: ShutdownStrategy) -> Self {
        self.shutdown_strategy = strategy;
        self
    }

    /// Total number of `up` attempts during startup.
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    pub fn pull_on_startup(mut self, pull: bool) -> Self {
        self.pull_on_startup = pull;
        self
    }

    pub fn remove_conflicting_containers(mut self, remove: bool) -> Self {
        self.remove_conflicting_containers = remove;
        self
    }

    /// Budget for the built-in baseline readiness check.
    pub fn native_readiness_timeout(mut self, timeout: Duration) -> Self {
        self.native_timeout = timeout;
        self
    }

    pub fn stats_consumer(mut self, consumer: Box<dyn StatsConsumer>) -> Self {
        self.consumers.push(consumer);
        self
    }

    pub fn log_collector(mut self, collector: Box<dyn LogCollector>) -> Self {
        self.log_collector = Some(collector);
        self
    }

    /// Apply a declarative options block on top of the current settings.
    pub fn options(mut self, options: FixtureOptions) -> Result<Self, ProjectNameError> {
        self.files.extend(options.files);
        if let Some(project) = options.project {
            self.project = Some(ProjectName::new(&project)?);
        }
        if let Some(timeout) = options.readiness_timeout {
            self.native_timeout = timeout;
        }
        if let Some(attempts) = options.retry_attempts {
            self.retry_attempts = attempts;
        }
        if let Some(strategy) = options.shutdown {
            self.shutdown_strategy = strategy;
        }
        if let Some(pull) = options.pull_on_startup {
            self.pull_on_startup = pull;
        }
        if let Some(remove) = options.remove_conflicting_containers {
            self.remove_conflicting_containers = remove;
        }
        Ok(self)
    }

    /// Wait for one service to pass a container check, with the default
    /// timeout. The service's readiness timer stops on first success.
    pub fn waiting_for_service(
        self,
        service: impl Into<String>,
        check: impl HealthCheck<Container> + 'static,
    ) -> Self {
        self.waiting_for_service_with_timeout(service, check, DEFAULT_READINESS_TIMEOUT)
    }

    pub fn waiting_for_service_with_timeout(
        mut self,
        service: impl Into<String>,
        check: impl HealthCheck<Container> + 'static,
        timeout: Duration,
    ) -> Self {
        let service = service.into();
        let timed = TimedCheck {
            recorder: self.stats_recorder.clone(),
            services: vec![service.clone()],
            inner: check,
        };
        self.waits
            .push(ClusterWait::new(checks::service(service, timed), timeout));
        self
    }

    /// Wait for several services to pass one list check together.
    pub fn waiting_for_services(
        self,
        services: Vec<String>,
        check: impl HealthCheck<Vec<Container>> + 'static,
    ) -> Self {
        self.waiting_for_services_with_timeout(services, check, DEFAULT_READINESS_TIMEOUT)
    }

    pub fn waiting_for_services_with_timeout(
        mut self,
        services: Vec<String>,
        check: impl HealthCheck<Vec<Container>> + 'static,
        timeout: Duration,
    ) -> Self {
        let timed = TimedCheck {
            recorder: self.stats_recorder.clone(),
            services: services.clone(),
            inner: check,
        };
        self.waits
            .push(ClusterWait::new(checks::services(services, timed), timeout));
        self
    }

    /// Wait for a check against a host-networked port at the cluster IP.
    pub fn waiting_for_host_networked_port(
        self,
        port: u16,
        check: impl HealthCheck<DockerPort> + 'static,
    ) -> Self {
        self.waiting_for_host_networked_port_with_timeout(port, check, DEFAULT_READINESS_TIMEOUT)
    }

    pub fn waiting_for_host_networked_port_with_timeout(
        mut self,
        port: u16,
        check: impl HealthCheck<DockerPort> + 'static,
        timeout: Duration,
    ) -> Self {
        let transformed = checks::transforming(
            move |cluster: &Cluster| DockerPort::host_networked(cluster.ip().to_string(), port),
            check,
        );
        self.waits.push(ClusterWait::new(transformed, timeout));
        self
    }

    /// Append a fully built wait. Waits run in declaration order.
    pub fn cluster_wait(mut self, wait: ClusterWait) -> Self {
        self.waits.push(wait);
        self
    }

    pub fn build(self) -> ComposeFixture {
        let project = self.project.unwrap_or_else(ProjectName::random);
        let executor = self
            .executor
            .unwrap_or_else(|| Arc::new(ShellExecutor::new(&project, &self.files)));

        // Pipeline assembly: conflict removal wraps the base invoker so
        // every retry attempt benefits from it.
        let base: Arc<dyn ComposeInvoker> = Arc::new(BaseInvoker::new(executor));
        let inner: Arc<dyn ComposeInvoker> = if self.remove_conflicting_containers {
            Arc::new(ConflictRemovingInvoker::new(base))
        } else {
            base
        };
        let invoker: Arc<dyn ComposeInvoker> = Arc::new(RetryingInvoker::new(
            self.retry_attempts,
            inner,
        ));

        let cache = Arc::new(ContainerCache::new(invoker.clone(), self.ip.clone()));
        let cluster = Cluster::new(self.ip.clone(), cache);

        ComposeFixture {
            project,
            ip: self.ip,
            invoker,
            cluster,
            pull_on_startup: self.pull_on_startup,
            native_timeout: self.native_timeout,
            waits: self.waits,
            shutdown_strategy: self.shutdown_strategy,
            stats_recorder: self.stats_recorder,
            consumers: self.consumers,
            log_collector: self
                .log_collector
                .unwrap_or_else(|| Box::new(NoOpLogCollector)),
            start_timings: None,
        }
    }
}
