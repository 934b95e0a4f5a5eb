use super::ParameterComposer;
use crate::config::BackendSettings;
use crate::error::TargetError;

/// Version-control repositories: the target is passed through as-is
#[derive(Debug, Default, Clone, Copy)]
pub struct GitComposer;

impl ParameterComposer for GitComposer {
    fn name(&self) -> &'static str {
        "git"
    }

    fn compose(
        &self,
        target: &str,
        _settings: &BackendSettings,
    ) -> Result<Vec<String>, TargetError> {
        Ok(vec![target.to_string()])
    }
}
