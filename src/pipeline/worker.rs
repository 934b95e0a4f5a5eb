//! Per-backend phase worker

use super::executor::{CollectRequest, EnrichRequest, PipelineExecutor};
use super::record::{PhaseRunRecord, TargetOutcome, TargetStatus};
use super::PhaseKind;
use crate::backends::BackendRegistry;
use crate::config::Config;
use crate::error::TargetError;
use crate::progress::{ProgressEvent, ProgressHandler};
use chrono::Utc;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Everything a worker reads; cheap to clone into spawned tasks
#[derive(Clone)]
pub struct PhaseContext {
    pub config: Arc<Config>,
    pub registry: Arc<BackendRegistry>,
    pub executor: Arc<dyn PipelineExecutor>,
    pub progress: Arc<dyn ProgressHandler>,
}

/// Processes one backend's targets in order; failures stay per target
pub async fn run_backend_phase(
    backend: &str,
    targets: &[String],
    phase: PhaseKind,
    ctx: &PhaseContext,
) -> PhaseRunRecord {
    let started_at = Utc::now();
    let start = Instant::now();
    debug!(backend, phase = %phase, "Worker started");

    ctx.progress.on_progress(&ProgressEvent::BackendStarted {
        phase,
        backend: backend.to_string(),
        targets: targets.len(),
    });

    let mut outcomes = Vec::with_capacity(targets.len());
    for target in targets {
        let target_start = Instant::now();
        let status = match run_target(backend, target, phase, ctx).await {
            Ok(()) => TargetStatus::Succeeded,
            Err(e) => {
                ctx.progress.on_progress(&ProgressEvent::TargetFailed {
                    phase,
                    backend: backend.to_string(),
                    target: target.clone(),
                    error: e.to_string(),
                });
                TargetStatus::Failed(e.to_string())
            }
        };
        outcomes.push(TargetOutcome {
            target: target.clone(),
            status,
            elapsed: target_start.elapsed(),
        });
    }

    let record = PhaseRunRecord {
        backend: backend.to_string(),
        phase,
        started_at,
        finished_at: Utc::now(),
        elapsed: start.elapsed(),
        outcomes,
    };

    ctx.progress.on_progress(&ProgressEvent::BackendFinished {
        phase,
        backend: backend.to_string(),
        succeeded: record.succeeded(),
        failed: record.failed(),
        duration: record.elapsed,
    });
    debug!(backend, phase = %phase, "Worker exiting");

    record
}

async fn run_target(
    backend: &str,
    target: &str,
    phase: PhaseKind,
    ctx: &PhaseContext,
) -> Result<(), TargetError> {
    let config = ctx.config.as_ref();
    let settings = config
        .backend(backend)
        .ok_or_else(|| TargetError::MissingBackendKey {
            backend: backend.to_string(),
            key: "raw_index",
        })?;
    let composer = ctx
        .registry
        .get(backend)
        .ok_or_else(|| TargetError::UnsupportedBackend(backend.to_string()))?;
    let params = composer.compose(target, settings)?;

    let operation = phase.operation();
    let call = async {
        match phase {
            PhaseKind::Collection => {
                let request = CollectRequest {
                    store_url: config.collection_url.clone(),
                    backend: backend.to_string(),
                    params,
                    raw_index: settings.raw_index.clone(),
                    enriched_index: settings.enriched_index.clone(),
                    target: target.to_string(),
                };
                ctx.executor.collect(&request).await
            }
            PhaseKind::Identities | PhaseKind::Enrichment => {
                let request = EnrichRequest {
                    store_url: config.collection_url.clone(),
                    backend: backend.to_string(),
                    params,
                    raw_index: settings.raw_index.clone(),
                    enriched_index: settings.enriched_index.clone(),
                    projects_db: config.projects_db.clone(),
                    identity_db: config.identity_db.clone(),
                    no_incremental: false,
                    only_identities: phase.only_identities(),
                    token: None,
                    studies_enabled: config.phases.studies,
                    only_studies: false,
                    enrichment_store_url: config.enrichment_url.clone(),
                };
                ctx.executor.enrich(&request).await
            }
        }
    };

    let guarded = AssertUnwindSafe(call).catch_unwind();
    let result = match config.target_timeout {
        Some(after) => tokio::time::timeout(after, guarded)
            .await
            .map_err(|_| TargetError::Timeout { operation, after })?,
        None => guarded.await,
    };

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(TargetError::Execution { operation, source }),
        Err(payload) => Err(TargetError::Panicked {
            operation,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
