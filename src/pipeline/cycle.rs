//! The run loop
//!
//! One cycle walks [`CycleState`] from `LoadingConfig` to `Sleeping`. Phases
//! within a cycle are strictly sequential and cycles never overlap. A fatal
//! [`AccessError`] ends the loop; everything else is logged and the next cycle
//! tries again.

use super::record::PhaseOutcome;
use super::runner::PhaseRunner;
use super::targets::{group_targets_by_backend, BackendGroups};
use super::PhaseKind;
use crate::config::{Config, ConfigSource, DEFAULT_SLEEP_SECS};
use crate::error::AccessError;
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::storage::{required_stores, StoreProbe};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    LoadingConfig,
    CheckingAccess,
    Collecting,
    ResolvingIdentities,
    Enriching,
    RunningStudies,
    UpdatingAliases,
    Sleeping,
}

impl CycleState {
    pub fn next(self) -> Self {
        match self {
            CycleState::LoadingConfig => CycleState::CheckingAccess,
            CycleState::CheckingAccess => CycleState::Collecting,
            CycleState::Collecting => CycleState::ResolvingIdentities,
            CycleState::ResolvingIdentities => CycleState::Enriching,
            CycleState::Enriching => CycleState::RunningStudies,
            CycleState::RunningStudies => CycleState::UpdatingAliases,
            CycleState::UpdatingAliases => CycleState::Sleeping,
            CycleState::Sleeping => CycleState::LoadingConfig,
        }
    }

    /// Fan-out phase driven in this state, if any
    pub fn phase(self) -> Option<PhaseKind> {
        match self {
            CycleState::Collecting => Some(PhaseKind::Collection),
            CycleState::ResolvingIdentities => Some(PhaseKind::Identities),
            CycleState::Enriching => Some(PhaseKind::Enrichment),
            _ => None,
        }
    }
}

/// What one pass through the states produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub config_error: Option<String>,
    pub phases: Vec<PhaseOutcome>,
    pub studies_ran: bool,
    pub cancelled: bool,
    pub elapsed: Duration,
    /// Delay before the next cycle, from the configuration just used
    pub sleep: Duration,
}

impl CycleReport {
    pub fn outcome(&self, phase: PhaseKind) -> Option<&PhaseOutcome> {
        self.phases.iter().find(|o| o.phase() == phase)
    }
}

pub struct CycleController {
    source: Arc<dyn ConfigSource>,
    probe: Arc<dyn StoreProbe>,
    runner: PhaseRunner,
    progress: Arc<dyn ProgressHandler>,
    cancel: CancellationToken,
    cycles: AtomicU64,
}

impl CycleController {
    pub fn new(
        source: Arc<dyn ConfigSource>,
        probe: Arc<dyn StoreProbe>,
        runner: PhaseRunner,
        progress: Arc<dyn ProgressHandler>,
    ) -> Self {
        Self {
            source,
            probe,
            runner,
            progress,
            cancel: CancellationToken::new(),
            cycles: AtomicU64::new(0),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cycles_started(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    /// Runs cycles until cancelled or a store becomes unreachable
    pub async fn run(&self) -> Result<(), AccessError> {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let report = self.run_cycle().await?;
            if report.cancelled {
                break;
            }

            self.progress.on_progress(&ProgressEvent::Sleeping {
                duration: report.sleep,
            });
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(report.sleep) => {}
            }
        }

        self.progress.on_progress(&ProgressEvent::Cancelled);
        Ok(())
    }

    /// Drives one pass from `LoadingConfig` up to, not including, `Sleeping`
    pub async fn run_cycle(&self) -> Result<CycleReport, AccessError> {
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        let start = Instant::now();
        let mut report = CycleReport {
            cycle,
            sleep: Duration::from_secs(DEFAULT_SLEEP_SECS),
            ..Default::default()
        };
        self.progress
            .on_progress(&ProgressEvent::CycleStarted { cycle });

        let mut config: Option<Arc<Config>> = None;
        let mut groups = BackendGroups::new();
        let mut state = CycleState::LoadingConfig;

        while state != CycleState::Sleeping {
            if self.cancel.is_cancelled() {
                debug!(?state, "Cycle interrupted");
                report.cancelled = true;
                break;
            }

            match state {
                CycleState::LoadingConfig => match self.source.load() {
                    Ok(loaded) => {
                        report.sleep = loaded.sleep;
                        groups = group_targets_by_backend(&loaded, self.runner.registry());
                        config = Some(Arc::new(loaded));
                    }
                    Err(e) => {
                        self.progress.on_progress(&ProgressEvent::ConfigLoadFailed {
                            cycle,
                            error: e.to_string(),
                        });
                        report.config_error = Some(e.to_string());
                        break;
                    }
                },
                CycleState::CheckingAccess => {
                    if let Some(config) = &config {
                        self.check_access(config).await?;
                    }
                }
                CycleState::Collecting | CycleState::ResolvingIdentities | CycleState::Enriching => {
                    if let (Some(config), Some(phase)) = (&config, state.phase()) {
                        let outcome = self.runner.run_phase(phase, &groups, config).await;
                        report.phases.push(outcome);
                    }
                }
                CycleState::RunningStudies => {
                    if let Some(config) = &config {
                        report.studies_ran = self.run_studies(config).await;
                    }
                }
                CycleState::UpdatingAliases => {
                    if let Some(config) = &config {
                        if let Err(e) = self.runner.executor().update_aliases(config).await {
                            error!(error = %e, "Alias update failed");
                        }
                    }
                }
                CycleState::Sleeping => {}
            }

            state = state.next();
        }

        report.elapsed = start.elapsed();
        self.progress.on_progress(&ProgressEvent::CycleComplete {
            cycle,
            duration: report.elapsed,
        });
        Ok(report)
    }

    /// Probes each store an enabled phase needs; no phase, no probe
    pub async fn check_access(&self, config: &Config) -> Result<(), AccessError> {
        for (store, url) in required_stores(config) {
            self.probe.probe(store, url).await?;
            self.progress.on_progress(&ProgressEvent::StoreReachable {
                store,
                url: url.to_string(),
            });
        }
        Ok(())
    }

    async fn run_studies(&self, config: &Config) -> bool {
        if !config.phases.studies {
            info!("[SKIP] Data studies disabled");
            return false;
        }

        info!("[START] Data studies starting");
        match self.runner.executor().run_studies(config).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Data studies failed");
                false
            }
        }
    }
}
