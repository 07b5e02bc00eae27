// ABOUTME: Health checks, combinators, and the readiness polling loop.
// ABOUTME: The Failure-retries / Error-aborts split is the core contract.

pub mod checks;
mod cluster_wait;
mod error;
mod healthcheck;

pub use cluster_wait::{ClusterWait, POLL_INTERVAL};
pub use error::WaitError;
pub use healthcheck::{HealthCheck, HealthCheckResult};
