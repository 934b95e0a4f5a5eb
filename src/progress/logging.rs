//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use crate::util::format_elapsed;
use tracing::{debug, error, info};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::CycleStarted { cycle } => {
                info!(cycle, "Starting cycle");
            }
            ProgressEvent::ConfigLoadFailed { cycle, error } => {
                error!(cycle, error = %error, "Configuration unavailable, skipping cycle");
            }
            ProgressEvent::StoreReachable { store, url } => {
                debug!(store = %store, url = %url, "Store reachable");
            }
            ProgressEvent::PhaseSkipped { phase } => {
                info!(phase = %phase, "[SKIP] {} disabled", phase);
            }
            ProgressEvent::PhaseStarted { phase, backends } => {
                info!(phase = %phase, backends, "[START] {} starting", phase);
            }
            ProgressEvent::BackendStarted {
                phase,
                backend,
                targets,
            } => {
                info!(phase = %phase, backend = %backend, targets, "{} starts for {}", phase, backend);
            }
            ProgressEvent::TargetFailed {
                phase,
                backend,
                target,
                error,
            } => {
                error!(
                    phase = %phase,
                    backend = %backend,
                    target = %target,
                    error = %error,
                    "Target processing failed"
                );
            }
            ProgressEvent::BackendFinished {
                phase,
                backend,
                succeeded,
                failed,
                duration,
            } => {
                info!(
                    phase = %phase,
                    backend = %backend,
                    succeeded,
                    failed,
                    duration_ms = duration.as_millis(),
                    "{} finished for {} in {}",
                    phase,
                    backend,
                    format_elapsed(*duration)
                );
            }
            ProgressEvent::WorkerLost { phase, error } => {
                error!(phase = %phase, error = %error, "Backend worker terminated abnormally");
            }
            ProgressEvent::PhaseComplete { phase, duration } => {
                info!(
                    phase = %phase,
                    duration_ms = duration.as_millis(),
                    "[END] {} phase finished in {}",
                    phase,
                    format_elapsed(*duration)
                );
            }
            ProgressEvent::CycleComplete { cycle, duration } => {
                info!(cycle, duration_ms = duration.as_millis(), "Cycle complete");
            }
            ProgressEvent::Sleeping { duration } => {
                debug!(sleep_secs = duration.as_secs(), "Sleeping until next cycle");
            }
            ProgressEvent::Cancelled => {
                info!("Stop requested, leaving run loop");
            }
        }
    }
}
