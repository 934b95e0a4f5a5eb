//! Utility modules for conductor
//!
//! - Structured logging setup and configuration
//! - Duration formatting

pub mod logging;
pub mod time;

pub use logging::{init_logging, LoggingConfig};
pub use time::format_elapsed;
