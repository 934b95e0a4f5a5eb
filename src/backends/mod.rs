//! Backend kinds and their parameter composers
//!
//! Each backend kind decodes its target identifiers into the argument vector
//! the external pipeline expects. Kinds are looked up by name through the
//! [`BackendRegistry`], so adding one never touches the phase code.

use crate::config::BackendSettings;
use crate::error::TargetError;

/// Builds invocation parameters for one target of a backend kind
pub trait ParameterComposer: Send + Sync {
    /// Backend name as it appears in the projects file (e.g. "git")
    fn name(&self) -> &'static str;

    fn compose(&self, target: &str, settings: &BackendSettings)
        -> Result<Vec<String>, TargetError>;
}

pub mod git;
pub mod github;
pub mod registry;

pub use git::GitComposer;
pub use github::GitHubComposer;
pub use registry::BackendRegistry;
