// ABOUTME: Container snapshot and docker port types.
// ABOUTME: A DockerPort answers the "is something listening" probe.

use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;

use super::error::ConnectionError;
use super::ports::PortMappings;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// One externally reachable port of a container: the host IP, the external
/// port bound on the host, and the internal port inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerPort {
    ip: String,
    external: u16,
    internal: u16,
}

impl DockerPort {
    pub fn new(ip: impl Into<String>, external: u16, internal: u16) -> Self {
        Self {
            ip: ip.into(),
            external,
            internal,
        }
    }

    /// A host-networked port, where external and internal are the same.
    pub fn host_networked(ip: impl Into<String>, port: u16) -> Self {
        Self::new(ip, port, port)
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn external(&self) -> u16 {
        self.external
    }

    pub fn internal(&self) -> u16 {
        self.internal
    }

    /// Probe whether anything accepts TCP connections on this port.
    pub async fn is_listening(&self) -> bool {
        let addr = format!("{}:{}", self.ip, self.external);
        matches!(
            tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr)).await,
            Ok(Ok(_))
        )
    }
}

impl fmt::Display for DockerPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}->{}", self.ip, self.external, self.internal)
    }
}

/// Immutable snapshot of one running service instance.
///
/// Re-resolved only through a fresh cache query; holding one never observes
/// later changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    name: String,
    ip: String,
    ports: PortMappings,
}

impl Container {
    pub fn new(name: impl Into<String>, ip: impl Into<String>, ports: PortMappings) -> Self {
        Self {
            name: name.into(),
            ip: ip.into(),
            ports,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn ports(&self) -> &PortMappings {
        &self.ports
    }

    /// The externally reachable port bound to the given internal port.
    pub fn port(&self, internal: u16) -> Result<DockerPort, ConnectionError> {
        self.ports
            .internal(internal)
            .map(|mapping| DockerPort::new(self.ip.clone(), mapping.external, mapping.internal))
            .ok_or_else(|| ConnectionError::UnknownPort {
                service: self.name.clone(),
                port: internal,
            })
    }
}
