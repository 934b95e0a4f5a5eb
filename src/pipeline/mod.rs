pub mod cycle;
pub mod executor;
pub mod phase;
pub mod record;
pub mod runner;
pub mod targets;
pub mod worker;

pub use cycle::{CycleController, CycleReport, CycleState};
pub use executor::{CollectRequest, CommandExecutor, DryRunExecutor, EnrichRequest, PipelineExecutor};
pub use phase::PhaseKind;
pub use record::{PhaseOutcome, PhaseReport, PhaseRunRecord, TargetOutcome, TargetStatus};
pub use runner::PhaseRunner;
pub use targets::{group_targets_by_backend, BackendGroup, BackendGroups};
pub use worker::{run_backend_phase, PhaseContext};
