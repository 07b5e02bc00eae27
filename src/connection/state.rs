// ABOUTME: Container state reported by the external tool's listing.
// ABOUTME: Tolerant parser over "service state [health]" lines.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateParseError {
    #[error("malformed listing line: `{0}`")]
    MalformedLine(String),

    #[error("unrecognized container state in line: `{0}`")]
    UnknownState(String),
}

/// Coarse container state, health-aware when the tool reports health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// Running, no health check defined.
    Up,
    /// Running and its health check passes.
    Healthy,
    /// Running but the health check has not passed yet.
    Starting,
    /// Running and the health check fails.
    Unhealthy,
    /// No longer running.
    Exited,
}

impl ContainerState {
    /// Whether this state counts as ready for the baseline readiness check.
    pub fn is_ready(&self) -> bool {
        matches!(self, ContainerState::Up | ContainerState::Healthy)
    }
}

/// One service's container state within the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceState {
    pub service: String,
    pub state: ContainerState,
}

impl ServiceState {
    pub fn new(service: impl Into<String>, state: ContainerState) -> Self {
        Self {
            service: service.into(),
            state,
        }
    }

    /// Parse one listing line: the service name followed by state words.
    pub fn parse_line(line: &str) -> Result<Self, StateParseError> {
        let mut tokens = line.split_whitespace();
        let service = tokens
            .next()
            .ok_or_else(|| StateParseError::MalformedLine(line.to_string()))?;
        let rest = tokens.collect::<Vec<_>>().join(" ").to_lowercase();
        if rest.is_empty() {
            return Err(StateParseError::MalformedLine(line.to_string()));
        }

        // Health wording wins over the bare running state; "unhealthy" must
        // be checked before "healthy" since it contains it.
        let state = if rest.contains("unhealthy") {
            ContainerState::Unhealthy
        } else if rest.contains("starting") {
            ContainerState::Starting
        } else if rest.contains("healthy") {
            ContainerState::Healthy
        } else if rest.contains("exit") || rest.contains("dead") {
            ContainerState::Exited
        } else if rest.contains("running") || rest.contains("up") {
            ContainerState::Up
        } else {
            return Err(StateParseError::UnknownState(line.to_string()));
        };

        Ok(Self::new(service, state))
    }

    /// Parse a whole listing, skipping blank lines.
    pub fn parse_listing(output: &str) -> Result<Vec<Self>, StateParseError> {
        output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Self::parse_line)
            .collect()
    }
}
