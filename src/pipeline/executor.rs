//! Seam to the external collection and enrichment pipeline
//!
//! The orchestrator never reads a data source itself; it hands each target to a
//! [`PipelineExecutor`]. [`CommandExecutor`] runs a configured program per
//! target, [`DryRunExecutor`] only logs what would run.

use crate::config::Config;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Arguments of one collection call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectRequest {
    pub store_url: String,
    pub backend: String,
    pub params: Vec<String>,
    pub raw_index: String,
    pub enriched_index: String,
    pub target: String,
}

/// Arguments of one enrichment call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichRequest {
    pub store_url: String,
    pub backend: String,
    pub params: Vec<String>,
    pub raw_index: String,
    pub enriched_index: String,
    pub projects_db: String,
    pub identity_db: String,
    pub no_incremental: bool,
    pub only_identities: bool,
    pub token: Option<String>,
    pub studies_enabled: bool,
    pub only_studies: bool,
    pub enrichment_store_url: String,
}

/// External pipeline operations; must tolerate concurrent calls for distinct backends
#[async_trait]
pub trait PipelineExecutor: Send + Sync {
    async fn collect(&self, request: &CollectRequest) -> Result<()>;

    async fn enrich(&self, request: &EnrichRequest) -> Result<()>;

    /// Studies step, run once per cycle after enrichment
    async fn run_studies(&self, _config: &Config) -> Result<()> {
        Ok(())
    }

    /// Index alias step, run once per cycle after studies
    async fn update_aliases(&self, _config: &Config) -> Result<()> {
        Ok(())
    }
}

impl CollectRequest {
    /// p2o-style argument vector
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-e".to_string(),
            self.store_url.clone(),
            "--index".to_string(),
            self.raw_index.clone(),
            "--index-enrich".to_string(),
            self.enriched_index.clone(),
            "--project".to_string(),
            self.target.clone(),
            "--no-enrich".to_string(),
            self.backend.clone(),
        ];
        args.extend(self.params.iter().cloned());
        args
    }
}

impl EnrichRequest {
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-e".to_string(),
            self.store_url.clone(),
            "--index".to_string(),
            self.raw_index.clone(),
            "--index-enrich".to_string(),
            self.enriched_index.clone(),
            "--only-enrich".to_string(),
            "--db-projects-map".to_string(),
            self.projects_db.clone(),
            "--db-sortinghat".to_string(),
            self.identity_db.clone(),
            "--elastic-url-enrich".to_string(),
            self.enrichment_store_url.clone(),
        ];
        if self.no_incremental {
            args.push("--no_incremental".to_string());
        }
        if self.only_identities {
            args.push("--only-identities".to_string());
        }
        if self.studies_enabled {
            args.push("--studies".to_string());
        }
        if self.only_studies {
            args.push("--only-studies".to_string());
        }
        if let Some(token) = &self.token {
            args.push("--github-token".to_string());
            args.push(token.clone());
        }
        args.push(self.backend.clone());
        args.extend(self.params.iter().cloned());
        args
    }
}

/// Runs one external process per target
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    collect_program: String,
    enrich_program: String,
    leading_args: Vec<String>,
}

impl CommandExecutor {
    pub fn new(collect_program: impl Into<String>, enrich_program: impl Into<String>) -> Self {
        Self {
            collect_program: collect_program.into(),
            enrich_program: enrich_program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }

    /// Builds an executor from `[executor]`; `None` when no program is set
    pub fn from_config(config: &Config) -> Option<Self> {
        let settings = &config.executor;
        let collect = settings
            .collect_program
            .clone()
            .or_else(|| settings.enrich_program.clone())?;
        let enrich = settings
            .enrich_program
            .clone()
            .unwrap_or_else(|| collect.clone());
        Some(Self::new(collect, enrich).with_leading_args(settings.args.clone()))
    }

    async fn spawn(&self, program: &str, args: Vec<String>) -> Result<()> {
        debug!(program, ?args, "Spawning pipeline process");

        let output = Command::new(program)
            .args(&self.leading_args)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to start '{}'", program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().last().unwrap_or("").trim();
            bail!("'{}' exited with {}: {}", program, output.status, last_line);
        }

        Ok(())
    }
}

#[async_trait]
impl PipelineExecutor for CommandExecutor {
    async fn collect(&self, request: &CollectRequest) -> Result<()> {
        self.spawn(&self.collect_program, request.to_args()).await
    }

    async fn enrich(&self, request: &EnrichRequest) -> Result<()> {
        self.spawn(&self.enrich_program, request.to_args()).await
    }
}

/// Logs each request instead of running it
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunExecutor;

#[async_trait]
impl PipelineExecutor for DryRunExecutor {
    async fn collect(&self, request: &CollectRequest) -> Result<()> {
        info!(
            backend = %request.backend,
            target = %request.target,
            index = %request.raw_index,
            "[DRY RUN] collect {}",
            request.to_args().join(" ")
        );
        Ok(())
    }

    async fn enrich(&self, request: &EnrichRequest) -> Result<()> {
        info!(
            backend = %request.backend,
            index = %request.enriched_index,
            only_identities = request.only_identities,
            "[DRY RUN] enrich {}",
            request.to_args().join(" ")
        );
        Ok(())
    }
}
