//! conductor - cycle orchestrator for multi-backend data pipelines
//!
//! Every cycle reloads the configuration, checks that the stores the enabled
//! phases need are reachable, then runs collection, identity resolution and
//! enrichment in that order. Within a phase each backend gets its own worker
//! task; the phase ends when the slowest backend is done.
//!
//! # Core Concepts
//!
//! - **Backend**: a kind of data source (`git`, `github`) with its own index
//!   pair and parameter rules, see [`backends`]
//! - **Target**: one concrete source a backend processes, e.g. a repository URL
//! - **Phase**: one pipeline stage, fanned out across backends, see [`pipeline`]
//! - **Cycle**: a pass through all enabled phases followed by a sleep
//!
//! # Example Usage
//!
//! ```no_run
//! use conductor::backends::BackendRegistry;
//! use conductor::config::FileConfigSource;
//! use conductor::pipeline::{CycleController, DryRunExecutor, PhaseRunner};
//! use conductor::progress::LoggingHandler;
//! use conductor::storage::HttpStoreProbe;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), conductor::AccessError> {
//! let progress = Arc::new(LoggingHandler);
//! let runner = PhaseRunner::new(
//!     Arc::new(BackendRegistry::with_defaults()),
//!     Arc::new(DryRunExecutor),
//!     progress.clone(),
//! );
//! let controller = CycleController::new(
//!     Arc::new(FileConfigSource::new("conductor.toml")),
//!     Arc::new(HttpStoreProbe::new()),
//!     runner,
//!     progress,
//! );
//! controller.run().await
//! # }
//! ```

pub mod backends;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod storage;
pub mod util;

pub use backends::{BackendRegistry, ParameterComposer};
pub use config::{Config, ConfigError, ConfigSource, FileConfigSource};
pub use error::{AccessError, StoreKind, TargetError};
pub use pipeline::{CycleController, PhaseKind, PhaseRunner, PipelineExecutor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_conductor() {
        assert_eq!(NAME, "conductor");
    }
}
