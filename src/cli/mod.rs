pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CheckArgs, CliArgs, Commands, OnceArgs, RunArgs, TargetsArgs};
pub use output::{OutputFormat, OutputFormatter};
