// ABOUTME: Validated domain identifiers.
// ABOUTME: Keeps project naming rules out of the orchestration code.

mod project_name;

pub use project_name::{ProjectName, ProjectNameError};
