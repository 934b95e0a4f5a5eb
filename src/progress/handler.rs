//! Progress handler trait and events

use crate::error::StoreKind;
use crate::pipeline::PhaseKind;
use std::sync::Mutex;
use std::time::Duration;

/// Events emitted while a cycle runs
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Cycle started
    CycleStarted { cycle: u64 },

    /// Configuration could not be loaded; the cycle is skipped
    ConfigLoadFailed { cycle: u64, error: String },

    /// A store answered its reachability probe
    StoreReachable { store: StoreKind, url: String },

    /// Phase disabled by configuration
    PhaseSkipped { phase: PhaseKind },

    /// Phase fan-out started
    PhaseStarted { phase: PhaseKind, backends: usize },

    /// A backend worker started
    BackendStarted {
        phase: PhaseKind,
        backend: String,
        targets: usize,
    },

    /// One target failed; the worker moves on
    TargetFailed {
        phase: PhaseKind,
        backend: String,
        target: String,
        error: String,
    },

    /// A backend worker finished all its targets
    BackendFinished {
        phase: PhaseKind,
        backend: String,
        succeeded: usize,
        failed: usize,
        duration: Duration,
    },

    /// A backend worker task died before reporting
    WorkerLost { phase: PhaseKind, error: String },

    /// All backend workers of a phase joined
    PhaseComplete { phase: PhaseKind, duration: Duration },

    /// Cycle finished, about to sleep
    CycleComplete { cycle: u64, duration: Duration },

    /// Waiting before the next cycle
    Sleeping { duration: Duration },

    /// Stop requested; the loop exits
    Cancelled,
}

/// Trait for handling progress events during a cycle
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// Keeps every event in arrival order
#[derive(Debug, Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Backends in the order their workers finished within a phase
    pub fn finished_backends(&self, phase: PhaseKind) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::BackendFinished {
                    phase: p, backend, ..
                } if p == phase => Some(backend),
                _ => None,
            })
            .collect()
    }
}

impl ProgressHandler for RecordingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
