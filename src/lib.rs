// ABOUTME: Library root for quayside - a docker-compose test fixture.
// ABOUTME: A test runner calls start() before tests and stop() after.

pub mod config;
pub mod connection;
pub mod error;
pub mod exec;
pub mod fixture;
pub mod logging;
pub mod logs;
pub mod shutdown;
pub mod stats;
pub mod types;
pub mod wait;

pub use config::{DEFAULT_READINESS_TIMEOUT, DEFAULT_RETRY_ATTEMPTS, FixtureOptions};
pub use error::{FixtureError, FixtureErrorKind, Result};
pub use fixture::{ComposeFixture, ComposeFixtureBuilder};
