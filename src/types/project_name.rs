// ABOUTME: Compose project name validation and random generation.
// ABOUTME: Project names must be safe to pass to the external tool unquoted.

use rand::Rng;
use rand::distributions::Alphanumeric;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectNameError {
    #[error("project name cannot be empty")]
    Empty,

    #[error("project name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("project name must start with a lowercase letter or digit")]
    BadFirstChar,

    #[error("invalid character in project name: '{0}'")]
    InvalidChar(char),
}

/// Name of one compose project, scoping every container the fixture manages.
///
/// Generated randomly per fixture by default so concurrent test runs on the
/// same host never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn new(value: &str) -> Result<Self, ProjectNameError> {
        if value.is_empty() {
            return Err(ProjectNameError::Empty);
        }

        if value.len() > 63 {
            return Err(ProjectNameError::TooLong);
        }

        let first = value.chars().next().unwrap_or('-');
        if !first.is_ascii_lowercase() && !first.is_ascii_digit() {
            return Err(ProjectNameError::BadFirstChar);
        }

        for c in value.chars() {
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '_' {
                return Err(ProjectNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    /// A fresh `quayside-` name with an 8 character random suffix.
    pub fn random() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(|b| (b as char).to_ascii_lowercase())
            .collect();

        Self(format!("quayside-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
