// ABOUTME: Stats consumer collaborator and a JSON file implementation.
// ABOUTME: One consumer's failure never blocks delivery to the rest.

use std::path::PathBuf;

use super::RunStats;

pub type ConsumerError = Box<dyn std::error::Error + Send + Sync>;

/// Receives the assembled [`RunStats`] once per fixture run.
pub trait StatsConsumer: Send + Sync {
    /// Label used when logging an isolated consumer failure.
    fn name(&self) -> &str {
        "stats consumer"
    }

    fn consume(&self, stats: &RunStats) -> Result<(), ConsumerError>;
}

/// Writes the run's stats as pretty-printed JSON to a file.
pub struct JsonFileStatsConsumer {
    path: PathBuf,
}

impl JsonFileStatsConsumer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StatsConsumer for JsonFileStatsConsumer {
    fn name(&self) -> &str {
        "json file"
    }

    fn consume(&self, stats: &RunStats) -> Result<(), ConsumerError> {
        let json = serde_json::to_string_pretty(stats)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
