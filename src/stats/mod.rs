// ABOUTME: Timing telemetry for one fixture run.
// ABOUTME: RunStats assembly and the consumer collaborator contract.

mod consumer;
mod recorder;

pub use consumer::{JsonFileStatsConsumer, StatsConsumer};
pub use recorder::{ServiceTimer, StatsRecorder};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Durations observed over one fixture run, assembled once right before
/// teardown finishes and handed to every registered consumer.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub recorded_at: DateTime<Utc>,

    /// The whole pull/build/up phase.
    #[serde(with = "humantime_serde")]
    pub startup: Duration,

    /// From the end of `up` until every declared wait succeeded.
    #[serde(with = "humantime_serde")]
    pub readiness: Duration,

    /// Per-service readiness timers. `None` means the timer never stopped,
    /// which is distinct from a zero duration.
    pub services: HashMap<String, Option<Duration>>,

    /// Teardown duration; absent when shutdown failed.
    #[serde(with = "humantime_serde")]
    pub shutdown: Option<Duration>,

    /// The shutdown failure, when there was one, preserved for diagnostics.
    pub shutdown_error: Option<String>,
}
