//! Progress reporting for orchestration cycles

mod handler;
mod logging;

pub use handler::{ProgressEvent, ProgressHandler, RecordingHandler};
pub use logging::LoggingHandler;
