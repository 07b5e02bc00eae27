// ABOUTME: Tracing subscriber setup for test harness processes.
// ABOUTME: Idempotent, so any test in the suite may call it first.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a global tracing subscriber honoring `RUST_LOG`, defaulting to
/// `info`. Safe to call from every test; only the first call installs.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}
