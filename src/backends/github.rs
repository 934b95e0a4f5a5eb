use super::ParameterComposer;
use crate::config::BackendSettings;
use crate::error::TargetError;

const BACKEND: &str = "github";

/// Hosted repositories addressed as `.../<owner>/<repository>`
#[derive(Debug, Default, Clone, Copy)]
pub struct GitHubComposer;

impl GitHubComposer {
    /// Splits the last two `/` segments off a repository URL
    pub fn owner_repo(target: &str) -> Result<(&str, &str), TargetError> {
        let malformed = || TargetError::MalformedTarget {
            backend: BACKEND.to_string(),
            target: target.to_string(),
        };

        let trimmed = target.strip_suffix('/').unwrap_or(target);
        let mut segments = trimmed.rsplit('/');
        let repo = segments.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
        let owner = segments.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;

        Ok((owner, repo))
    }
}

impl ParameterComposer for GitHubComposer {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn compose(
        &self,
        target: &str,
        settings: &BackendSettings,
    ) -> Result<Vec<String>, TargetError> {
        let (owner, repo) = Self::owner_repo(target)?;
        let token = settings
            .token
            .as_deref()
            .ok_or_else(|| TargetError::MissingBackendKey {
                backend: BACKEND.to_string(),
                key: "token",
            })?;

        Ok(vec![
            "--owner".to_string(),
            owner.to_string(),
            "--repository".to_string(),
            repo.to_string(),
            "--sleep-for-rate".to_string(),
            "-t".to_string(),
            token.to_string(),
        ])
    }
}
