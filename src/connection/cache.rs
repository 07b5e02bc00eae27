// ABOUTME: Lazy, memoized, concurrency-safe container lookup.
// ABOUTME: Entries live for one orchestration run and are never invalidated.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::container::Container;
use super::error::ConnectionError;
use super::state::ServiceState;
use crate::exec::ComposeInvoker;

/// Memoized service name to container mapping.
///
/// A miss lists the project's running containers through the invoker and
/// resolves their port bindings. Hits only take the read lock, so they never
/// wait on an in-flight population; misses serialize on the population
/// guard and the loser reuses the winner's entries.
pub struct ContainerCache {
    invoker: Arc<dyn ComposeInvoker>,
    ip: String,
    containers: RwLock<HashMap<String, Container>>,
    populate: Mutex<()>,
}

impl ContainerCache {
    pub fn new(invoker: Arc<dyn ComposeInvoker>, ip: impl Into<String>) -> Self {
        Self {
            invoker,
            ip: ip.into(),
            containers: RwLock::new(HashMap::new()),
            populate: Mutex::new(()),
        }
    }

    /// Look up a service's container, populating the cache on a miss.
    ///
    /// Fails with `UnknownService` when the project has no running container
    /// for the name even after a fresh listing.
    pub async fn container(&self, service: &str) -> Result<Container, ConnectionError> {
        if let Some(container) = self.containers.read().await.get(service) {
            return Ok(container.clone());
        }

        let _guard = self.populate.lock().await;
        // A concurrent miss may have populated while we queued on the guard.
        if let Some(container) = self.containers.read().await.get(service) {
            return Ok(container.clone());
        }

        let listing = self.invoker.ps().await?;
        let unresolved: Vec<String> = {
            let containers = self.containers.read().await;
            listing
                .iter()
                .filter(|state| !containers.contains_key(&state.service))
                .map(|state| state.service.clone())
                .collect()
        };

        let mut resolved = Vec::with_capacity(unresolved.len());
        for name in unresolved {
            let ports = self.invoker.ports(&name).await?;
            resolved.push(Container::new(name, self.ip.clone(), ports));
        }

        let mut containers = self.containers.write().await;
        for container in resolved {
            containers.insert(container.name().to_string(), container);
        }

        containers
            .get(service)
            .cloned()
            .ok_or_else(|| ConnectionError::UnknownService(service.to_string()))
    }

    /// Current container states straight from the external tool, uncached.
    pub async fn service_states(&self) -> Result<Vec<ServiceState>, ConnectionError> {
        Ok(self.invoker.ps().await?)
    }
}
