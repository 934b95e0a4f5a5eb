//! Fan-out of one phase across backends

use super::record::{PhaseOutcome, PhaseReport};
use super::targets::BackendGroups;
use super::worker::{run_backend_phase, PhaseContext};
use super::PhaseKind;
use super::PipelineExecutor;
use crate::backends::BackendRegistry;
use crate::config::Config;
use crate::progress::{ProgressEvent, ProgressHandler};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::debug;

/// Spawns one worker per backend and joins them all
#[derive(Clone)]
pub struct PhaseRunner {
    registry: Arc<BackendRegistry>,
    executor: Arc<dyn PipelineExecutor>,
    progress: Arc<dyn ProgressHandler>,
}

impl PhaseRunner {
    pub fn new(
        registry: Arc<BackendRegistry>,
        executor: Arc<dyn PipelineExecutor>,
        progress: Arc<dyn ProgressHandler>,
    ) -> Self {
        Self {
            registry,
            executor,
            progress,
        }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn executor(&self) -> &Arc<dyn PipelineExecutor> {
        &self.executor
    }

    pub async fn run_phase(
        &self,
        phase: PhaseKind,
        groups: &BackendGroups,
        config: &Arc<Config>,
    ) -> PhaseOutcome {
        if !phase.is_enabled(&config.phases) {
            self.progress
                .on_progress(&ProgressEvent::PhaseSkipped { phase });
            return PhaseOutcome::Skipped { phase };
        }

        let start = Instant::now();
        self.progress.on_progress(&ProgressEvent::PhaseStarted {
            phase,
            backends: groups.len(),
        });

        let ctx = PhaseContext {
            config: Arc::clone(config),
            registry: Arc::clone(&self.registry),
            executor: Arc::clone(&self.executor),
            progress: Arc::clone(&self.progress),
        };

        let mut join_set = JoinSet::new();
        for group in groups.iter() {
            let ctx = ctx.clone();
            let backend = group.backend.clone();
            let targets = group.targets.clone();
            debug!(backend = %backend, phase = %phase, "Spawning backend worker");
            join_set.spawn(async move { run_backend_phase(&backend, &targets, phase, &ctx).await });
        }

        let mut records = Vec::with_capacity(groups.len());
        let mut lost_workers = 0;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(record) => records.push(record),
                Err(e) => {
                    lost_workers += 1;
                    self.progress.on_progress(&ProgressEvent::WorkerLost {
                        phase,
                        error: e.to_string(),
                    });
                }
            }
        }

        let elapsed = start.elapsed();
        self.progress.on_progress(&ProgressEvent::PhaseComplete {
            phase,
            duration: elapsed,
        });

        PhaseOutcome::Completed(PhaseReport {
            phase,
            records,
            elapsed,
            lost_workers,
        })
    }
}
