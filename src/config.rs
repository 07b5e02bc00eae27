// ABOUTME: Declarative fixture options and their defaults.
// ABOUTME: YAML parsing with humantime durations, applied onto the builder.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::shutdown::ShutdownStrategy;

/// Default budget for readiness checks.
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(120);

/// Default total number of `up` attempts.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 2;

/// The scalar configuration surface of the fixture, loadable from YAML.
///
/// Health checks and stats consumers are code, so they stay on the builder;
/// everything declarative lives here. Unset fields keep the builder's
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureOptions {
    #[serde(default)]
    pub files: Vec<PathBuf>,

    #[serde(default)]
    pub project: Option<String>,

    #[serde(default, with = "humantime_serde")]
    pub readiness_timeout: Option<Duration>,

    #[serde(default)]
    pub retry_attempts: Option<u32>,

    #[serde(default)]
    pub shutdown: Option<ShutdownStrategy>,

    #[serde(default)]
    pub pull_on_startup: Option<bool>,

    #[serde(default)]
    pub remove_conflicting_containers: Option<bool>,
}

impl FixtureOptions {
    pub fn from_yaml(input: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_options_block() {
        let options = FixtureOptions::from_yaml(
            r#"
files:
  - docker-compose.yml
  - docker-compose.ci.yml
project: magic-ci
readiness_timeout: 3m
retry_attempts: 3
shutdown: graceful
pull_on_startup: true
remove_conflicting_containers: false
"#,
        )
        .unwrap();

        assert_eq!(options.files.len(), 2);
        assert_eq!(options.project.as_deref(), Some("magic-ci"));
        assert_eq!(options.readiness_timeout, Some(Duration::from_secs(180)));
        assert_eq!(options.retry_attempts, Some(3));
        assert_eq!(options.shutdown, Some(ShutdownStrategy::Graceful));
        assert_eq!(options.pull_on_startup, Some(true));
        assert_eq!(options.remove_conflicting_containers, Some(false));
    }

    #[test]
    fn empty_block_leaves_everything_unset() {
        let options = FixtureOptions::from_yaml("{}").unwrap();
        assert!(options.files.is_empty());
        assert!(options.project.is_none());
        assert!(options.readiness_timeout.is_none());
        assert!(options.shutdown.is_none());
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(FixtureOptions::from_yaml("keep_running: true").is_err());
    }
}
