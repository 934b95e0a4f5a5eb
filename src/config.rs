//! Orchestrator configuration
//!
//! A settings file (TOML) names the stores, phase switches, per-backend index
//! pairs and a projects file (JSON) that declares which targets each project
//! tracks for each backend. Both are read again at the start of every cycle,
//! so edits take effect without a restart.

use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SLEEP_SECS: u64 = 10;
pub const CONFIG_ENV_VAR: &str = "CONDUCTOR_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration file given. Pass --config or set CONDUCTOR_CONFIG")]
    MissingPath,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse projects file {path}: {source}")]
    Projects {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid projects file {path}: {message}")]
    ProjectsShape { path: PathBuf, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Phase switches from the `[phases]` section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PhaseFlags {
    #[serde(default)]
    pub collection: bool,
    #[serde(default)]
    pub identities: bool,
    #[serde(default)]
    pub enrichment: bool,
    #[serde(default)]
    pub studies: bool,
}

impl PhaseFlags {
    pub fn all() -> Self {
        Self {
            collection: true,
            identities: true,
            enrichment: true,
            studies: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.collection || self.identities || self.enrichment || self.studies
    }

    /// Phases that read raw items from the collection store
    pub fn needs_collection_store(&self) -> bool {
        self.any()
    }

    /// Phases that write into the enrichment store
    pub fn needs_enrichment_store(&self) -> bool {
        self.identities || self.enrichment || self.studies
    }
}

/// Index names and secrets for one backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendSettings {
    pub raw_index: String,
    pub enriched_index: String,
    #[serde(default)]
    pub token: Option<String>,
}

impl BackendSettings {
    pub fn new(raw_index: impl Into<String>, enriched_index: impl Into<String>) -> Self {
        Self {
            raw_index: raw_index.into(),
            enriched_index: enriched_index.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// One project from the projects file; backends are looked up by name, so
/// only the project list keeps file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub backends: HashMap<String, Vec<String>>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backends: HashMap::new(),
        }
    }

    pub fn with_targets<I, S>(mut self, backend: &str, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backends
            .entry(backend.to_string())
            .or_default()
            .extend(targets.into_iter().map(Into::into));
        self
    }

    pub fn targets(&self, backend: &str) -> Option<&[String]> {
        self.backends.get(backend).map(Vec::as_slice)
    }
}

/// External program settings from the `[executor]` section
///
/// Read once at startup. Unlike the rest of the settings, changes here take
/// effect only after a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExecutorSettings {
    #[serde(default)]
    pub collect_program: Option<String>,
    #[serde(default)]
    pub enrich_program: Option<String>,
    /// Extra leading arguments passed to both programs
    #[serde(default)]
    pub args: Vec<String>,
}

/// Configuration for one cycle
#[derive(Debug, Clone)]
pub struct Config {
    pub collection_url: String,
    pub enrichment_url: String,
    pub phases: PhaseFlags,
    pub projects: Vec<Project>,
    pub backends: HashMap<String, BackendSettings>,
    pub projects_db: String,
    pub identity_db: String,
    pub sleep: Duration,
    pub target_timeout: Option<Duration>,
    pub executor: ExecutorSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection_url: String::new(),
            enrichment_url: String::new(),
            phases: PhaseFlags::default(),
            projects: Vec::new(),
            backends: HashMap::new(),
            projects_db: String::new(),
            identity_db: String::new(),
            sleep: Duration::from_secs(DEFAULT_SLEEP_SECS),
            target_timeout: None,
            executor: ExecutorSettings::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stores(
        mut self,
        collection_url: impl Into<String>,
        enrichment_url: impl Into<String>,
    ) -> Self {
        self.collection_url = collection_url.into();
        self.enrichment_url = enrichment_url.into();
        self
    }

    pub fn with_phases(mut self, phases: PhaseFlags) -> Self {
        self.phases = phases;
        self
    }

    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.push(project);
        self
    }

    pub fn with_backend(mut self, name: &str, settings: BackendSettings) -> Self {
        self.backends.insert(name.to_string(), settings);
        self
    }

    pub fn with_sleep(mut self, sleep: Duration) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn with_target_timeout(mut self, timeout: Duration) -> Self {
        self.target_timeout = Some(timeout);
        self
    }

    pub fn backend(&self, name: &str) -> Option<&BackendSettings> {
        self.backends.get(name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phases.needs_collection_store() && self.collection_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "es_collection.url must be set when any phase is enabled".to_string(),
            ));
        }
        if self.phases.needs_enrichment_store() && self.enrichment_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "es_enrichment.url must be set when identities, enrichment or studies is enabled"
                    .to_string(),
            ));
        }

        for (name, settings) in &self.backends {
            if settings.raw_index.trim().is_empty() || settings.enriched_index.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "backends.{} needs both raw_index and enriched_index",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Parses a settings document; a relative projects file resolves against the directory of `path`.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawSettings = toml::from_str(content).map_err(|source| ConfigError::Settings {
            path: path.to_path_buf(),
            source,
        })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let projects_path = base_dir.join(&raw.projects.projects_file);
        let projects_content =
            fs::read_to_string(&projects_path).map_err(|source| ConfigError::Io {
                path: projects_path.clone(),
                source,
            })?;
        let projects = parse_projects(&projects_content, &projects_path)?;

        let target_timeout = match raw.general.target_timeout {
            Some(0) | None => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            collection_url: raw.es_collection.url,
            enrichment_url: raw.es_enrichment.url,
            phases: raw.phases,
            projects,
            backends: raw.backends,
            projects_db: raw.projects.database,
            identity_db: raw.sortinghat.database,
            sleep: Duration::from_secs(raw.general.sleep.unwrap_or(DEFAULT_SLEEP_SECS)),
            target_timeout,
            executor: raw.executor,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content, path)?;
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conductor Configuration:")?;
        writeln!(f, "  Collection Store: {}", self.collection_url)?;
        writeln!(f, "  Enrichment Store: {}", self.enrichment_url)?;
        writeln!(
            f,
            "  Phases: collection={} identities={} enrichment={} studies={}",
            self.phases.collection,
            self.phases.identities,
            self.phases.enrichment,
            self.phases.studies
        )?;
        writeln!(f, "  Projects: {}", self.projects.len())?;
        let mut backends: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        backends.sort_unstable();
        writeln!(f, "  Backends: {}", backends.join(", "))?;
        write!(f, "  Sleep: {}s", self.sleep.as_secs())
    }
}

/// Resolves the settings path from the CLI flag or the environment
pub fn resolve_config_path(flag: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    env::var(CONFIG_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::MissingPath)
}

/// Where each cycle's configuration comes from
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<Config, ConfigError>;
}

/// Reads the settings file from disk on every call
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load(&self.path)
    }
}

/// Always hands out the same configuration
#[derive(Debug, Clone)]
pub struct StaticConfigSource {
    config: Config,
}

impl StaticConfigSource {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigSource for StaticConfigSource {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(self.config.clone())
    }
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default)]
    general: RawGeneral,
    es_collection: RawStore,
    es_enrichment: RawStore,
    projects: RawProjects,
    sortinghat: RawDatabase,
    #[serde(default)]
    phases: PhaseFlags,
    #[serde(default)]
    backends: HashMap<String, BackendSettings>,
    #[serde(default)]
    executor: ExecutorSettings,
}

#[derive(Debug, Default, Deserialize)]
struct RawGeneral {
    sleep: Option<u64>,
    target_timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawStore {
    url: String,
}

#[derive(Debug, Deserialize)]
struct RawProjects {
    database: String,
    projects_file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawDatabase {
    database: String,
}

fn parse_projects(content: &str, path: &Path) -> Result<Vec<Project>, ConfigError> {
    let shape_error = |message: String| ConfigError::ProjectsShape {
        path: path.to_path_buf(),
        message,
    };

    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|source| ConfigError::Projects {
            path: path.to_path_buf(),
            source,
        })?;

    let root = value
        .as_object()
        .ok_or_else(|| shape_error("top level must be an object of projects".to_string()))?;

    let mut projects = Vec::with_capacity(root.len());
    for (name, backends) in root {
        let backends = backends
            .as_object()
            .ok_or_else(|| shape_error(format!("project '{}' must be an object", name)))?;

        let mut project = Project::new(name.clone());
        for (backend, targets) in backends {
            let targets: Vec<String> =
                serde_json::from_value(targets.clone()).map_err(|_| {
                    shape_error(format!(
                        "project '{}' backend '{}' must list target strings",
                        name, backend
                    ))
                })?;
            project = project.with_targets(backend, targets);
        }
        projects.push(project);
    }

    Ok(projects)
}
