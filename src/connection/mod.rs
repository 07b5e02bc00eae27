// ABOUTME: Container and cluster model with a memoized lookup cache.
// ABOUTME: Snapshots resolved from the external tool, never mutated in place.

mod cache;
mod cluster;
mod container;
mod error;
mod ports;
mod state;

pub use cache::ContainerCache;
pub use cluster::Cluster;
pub use container::{Container, DockerPort};
pub use error::ConnectionError;
pub use ports::{PortMapping, PortMappings, PortParseError};
pub use state::{ContainerState, ServiceState, StateParseError};
