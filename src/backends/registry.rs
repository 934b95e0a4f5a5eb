//! Backend registry

use super::ParameterComposer;
use std::sync::Arc;

/// Registered backend kinds, kept in registration order
#[derive(Clone)]
pub struct BackendRegistry {
    composers: Vec<Arc<dyn ParameterComposer>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            composers: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::GitComposer));
        registry.register(Arc::new(super::GitHubComposer));
        registry
    }

    /// Adds a kind, replacing any earlier one with the same name in place
    pub fn register(&mut self, composer: Arc<dyn ParameterComposer>) {
        match self
            .composers
            .iter()
            .position(|c| c.name() == composer.name())
        {
            Some(idx) => self.composers[idx] = composer,
            None => self.composers.push(composer),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn ParameterComposer> {
        self.composers
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    /// Backend names in the fixed order grouping walks them
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.composers.iter().map(|c| c.name())
    }

    pub fn len(&self) -> usize {
        self.composers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.composers.is_empty()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendSettings;
    use crate::error::TargetError;

    struct MboxComposer;

    impl ParameterComposer for MboxComposer {
        fn name(&self) -> &'static str {
            "mbox"
        }

        fn compose(
            &self,
            target: &str,
            _settings: &BackendSettings,
        ) -> Result<Vec<String>, TargetError> {
            Ok(vec![target.to_string(), "/var/mail".to_string()])
        }
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = BackendRegistry::with_defaults();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["git", "github"]);
    }

    #[test]
    fn test_get_unknown() {
        let registry = BackendRegistry::with_defaults();
        assert!(registry.get("gerrit").is_none());
        assert!(registry.get("git").is_some());
    }

    #[test]
    fn test_register_new_kind() {
        let mut registry = BackendRegistry::with_defaults();
        registry.register(Arc::new(MboxComposer));

        assert_eq!(registry.names().last(), Some("mbox"));
        let params = registry
            .get("mbox")
            .unwrap()
            .compose("dev-list", &BackendSettings::new("r", "e"))
            .unwrap();
        assert_eq!(params, vec!["dev-list", "/var/mail"]);
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = BackendRegistry::with_defaults();
        registry.register(Arc::new(crate::backends::GitComposer));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().next(), Some("git"));
    }
}
