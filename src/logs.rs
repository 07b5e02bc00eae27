// ABOUTME: Log collection collaborator contract.
// ABOUTME: Receives per-service output streams for the run's duration.

use async_trait::async_trait;

use crate::connection::Cluster;

/// Collects container logs while the cluster runs. The formatting and file
/// handling live in implementations outside this crate.
#[async_trait]
pub trait LogCollector: Send + Sync {
    async fn start_collecting(&mut self, cluster: &Cluster) -> Result<(), std::io::Error>;
    async fn stop_collecting(&mut self) -> Result<(), std::io::Error>;
}

/// Default collector that drops all logs.
pub struct NoOpLogCollector;

#[async_trait]
impl LogCollector for NoOpLogCollector {
    async fn start_collecting(&mut self, _cluster: &Cluster) -> Result<(), std::io::Error> {
        Ok(())
    }

    async fn stop_collecting(&mut self) -> Result<(), std::io::Error> {
        Ok(())
    }
}
