//! Grouping of declared targets by backend

use crate::backends::BackendRegistry;
use crate::config::Config;
use serde::Serialize;
use tracing::debug;

/// Targets of one backend, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendGroup {
    pub backend: String,
    pub targets: Vec<String>,
}

/// Backend → targets, ordered by backend registration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BackendGroups {
    groups: Vec<BackendGroup>,
}

impl BackendGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends targets to a backend, creating its group on first use
    pub fn extend<I>(&mut self, backend: &str, targets: I)
    where
        I: IntoIterator<Item = String>,
    {
        match self.groups.iter_mut().find(|g| g.backend == backend) {
            Some(group) => group.targets.extend(targets),
            None => self.groups.push(BackendGroup {
                backend: backend.to_string(),
                targets: targets.into_iter().collect(),
            }),
        }
    }

    pub fn get(&self, backend: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|g| g.backend == backend)
            .map(|g| g.targets.as_slice())
    }

    pub fn backends(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.backend.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_targets(&self) -> usize {
        self.groups.iter().map(|g| g.targets.len()).sum()
    }
}

impl IntoIterator for BackendGroups {
    type Item = BackendGroup;
    type IntoIter = std::vec::IntoIter<BackendGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Walks registered backend kinds, then projects in file order, concatenating
/// their targets. Duplicates are kept. Backends without a settings entry are
/// left out, as are projects that declare an empty list.
pub fn group_targets_by_backend(config: &Config, registry: &BackendRegistry) -> BackendGroups {
    let mut groups = BackendGroups::new();

    for backend in registry.names() {
        if config.backend(backend).is_none() {
            if config.projects.iter().any(|p| p.targets(backend).is_some()) {
                debug!(backend, "Backend has no settings section, skipping its targets");
            }
            continue;
        }

        for project in &config.projects {
            match project.targets(backend) {
                Some(targets) if !targets.is_empty() => {
                    groups.extend(backend, targets.iter().cloned());
                }
                _ => {}
            }
        }
    }

    debug!(
        backends = groups.len(),
        targets = groups.total_targets(),
        "Targets grouped by backend"
    );
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::ParameterComposer;
    use crate::config::{BackendSettings, Project};
    use crate::error::TargetError;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct NamedComposer(&'static str);

    impl ParameterComposer for NamedComposer {
        fn name(&self) -> &'static str {
            self.0
        }

        fn compose(
            &self,
            target: &str,
            _settings: &BackendSettings,
        ) -> Result<Vec<String>, TargetError> {
            Ok(vec![target.to_string()])
        }
    }

    fn registry(names: &[&'static str]) -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        for name in names {
            registry.register(Arc::new(NamedComposer(*name)));
        }
        registry
    }

    fn config_with(backends: &[&str], projects: Vec<Project>) -> Config {
        let mut config = Config::new();
        for backend in backends {
            config = config.with_backend(backend, BackendSettings::new("raw", "enriched"));
        }
        for project in projects {
            config = config.with_project(project);
        }
        config
    }

    #[test]
    fn test_two_projects_shared_backend() {
        let config = config_with(
            &["backendA", "backendB"],
            vec![
                Project::new("P1").with_targets("backendA", ["x"]),
                Project::new("P2")
                    .with_targets("backendA", ["y"])
                    .with_targets("backendB", ["z"]),
            ],
        );

        let groups = group_targets_by_backend(&config, &registry(&["backendA", "backendB"]));

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get("backendA"), Some(&["x".to_string(), "y".to_string()][..]));
        assert_eq!(groups.get("backendB"), Some(&["z".to_string()][..]));
    }

    #[test]
    fn test_backend_order_follows_registry() {
        let config = config_with(
            &["git", "github"],
            vec![Project::new("p")
                .with_targets("github", ["o/r"])
                .with_targets("git", ["g"])],
        );

        let groups = group_targets_by_backend(&config, &registry(&["github", "git"]));
        assert_eq!(groups.backends().collect::<Vec<_>>(), vec!["github", "git"]);
    }

    #[test]
    fn test_duplicates_preserved_and_multiset_equal() {
        let projects = vec![
            Project::new("p1")
                .with_targets("git", ["a", "b"])
                .with_targets("github", ["o/r"]),
            Project::new("p2")
                .with_targets("git", ["a"])
                .with_targets("github", ["o/r", "o/s"]),
            Project::new("p3"),
        ];
        let config = config_with(&["git", "github"], projects.clone());
        let groups = group_targets_by_backend(&config, &registry(&["git", "github"]));

        let mut expected: HashMap<(String, String), usize> = HashMap::new();
        for project in &projects {
            for (backend, targets) in &project.backends {
                for target in targets {
                    *expected.entry((backend.clone(), target.clone())).or_default() += 1;
                }
            }
        }

        let mut actual: HashMap<(String, String), usize> = HashMap::new();
        for group in groups.iter() {
            for target in &group.targets {
                *actual
                    .entry((group.backend.clone(), target.clone()))
                    .or_default() += 1;
            }
        }

        assert_eq!(actual, expected);
        assert_eq!(groups.get("git"), Some(&["a".to_string(), "b".to_string(), "a".to_string()][..]));
    }

    #[test]
    fn test_backend_without_settings_is_skipped() {
        let config = config_with(
            &["git"],
            vec![Project::new("p")
                .with_targets("git", ["g"])
                .with_targets("github", ["o/r"])],
        );

        let groups = group_targets_by_backend(&config, &registry(&["git", "github"]));
        assert_eq!(groups.backends().collect::<Vec<_>>(), vec!["git"]);
    }

    #[test]
    fn test_unregistered_backend_is_ignored() {
        let config = config_with(
            &["git", "jira"],
            vec![Project::new("p")
                .with_targets("git", ["g"])
                .with_targets("jira", ["https://issues.example.com"])],
        );

        let groups = group_targets_by_backend(&config, &BackendRegistry::with_defaults());
        assert!(groups.get("jira").is_none());
        assert_eq!(groups.total_targets(), 1);
    }

    #[test]
    fn test_empty_mapping() {
        let config = config_with(&["git"], vec![]);
        let groups = group_targets_by_backend(&config, &BackendRegistry::with_defaults());
        assert!(groups.is_empty());
    }

    #[test]
    fn test_empty_target_list_creates_no_group() {
        let config = config_with(
            &["git"],
            vec![Project::new("p").with_targets("git", Vec::<String>::new())],
        );
        let groups = group_targets_by_backend(&config, &BackendRegistry::with_defaults());
        assert!(groups.is_empty());
    }
}
