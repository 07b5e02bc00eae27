// ABOUTME: Per-service readiness timers with compute-if-absent semantics.
// ABOUTME: A timer starts on first reference and its duration fixes on stop.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One service's readiness timer. Started at creation; the first `stop`
/// fixes the duration, later calls are no-ops.
pub struct ServiceTimer {
    started: Instant,
    stopped: Mutex<Option<Duration>>,
}

impl ServiceTimer {
    fn start_now() -> Self {
        Self {
            started: Instant::now(),
            stopped: Mutex::new(None),
        }
    }

    pub fn stop(&self) {
        let mut stopped = self.stopped.lock();
        if stopped.is_none() {
            *stopped = Some(self.started.elapsed());
        }
    }

    /// The fixed duration, or `None` while the timer is still running.
    pub fn result(&self) -> Option<Duration> {
        *self.stopped.lock()
    }
}

/// Concurrent map of service name to timer.
#[derive(Default)]
pub struct StatsRecorder {
    timers: Mutex<HashMap<String, Arc<ServiceTimer>>>,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The timer for `service`, created and started on first reference.
    /// Subsequent calls return the same timer without restarting it.
    pub fn for_service(&self, service: &str) -> Arc<ServiceTimer> {
        self.timers
            .lock()
            .entry(service.to_string())
            .or_insert_with(|| Arc::new(ServiceTimer::start_now()))
            .clone()
    }

    /// Snapshot of every referenced service. A never-stopped timer reports
    /// `None`, never a zero duration.
    pub fn results(&self) -> HashMap<String, Option<Duration>> {
        self.timers
            .lock()
            .iter()
            .map(|(name, timer)| (name.clone(), timer.result()))
            .collect()
    }
}
