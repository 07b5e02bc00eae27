// ABOUTME: Cluster view over the container cache.
// ABOUTME: Delegates lookups; owns no container state of its own.

use std::sync::Arc;

use super::cache::ContainerCache;
use super::container::Container;
use super::error::ConnectionError;
use super::state::ServiceState;

/// The set of running containers for one project, addressable by service
/// name. A value is a view: cloning it shares the underlying cache.
#[derive(Clone)]
pub struct Cluster {
    ip: String,
    cache: Arc<ContainerCache>,
}

impl Cluster {
    pub fn new(ip: impl Into<String>, cache: Arc<ContainerCache>) -> Self {
        Self {
            ip: ip.into(),
            cache,
        }
    }

    /// Host IP of the machine running the containers. Fixed at construction.
    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub async fn container(&self, service: &str) -> Result<Container, ConnectionError> {
        self.cache.container(service).await
    }

    pub async fn containers(&self, services: &[String]) -> Result<Vec<Container>, ConnectionError> {
        let mut containers = Vec::with_capacity(services.len());
        for service in services {
            containers.push(self.cache.container(service).await?);
        }
        Ok(containers)
    }

    pub async fn service_states(&self) -> Result<Vec<ServiceState>, ConnectionError> {
        self.cache.service_states().await
    }
}
