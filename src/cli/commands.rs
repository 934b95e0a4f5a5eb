use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Cycle orchestrator for multi-backend collection and enrichment
#[derive(Parser, Debug)]
#[command(
    name = "conductor",
    about = "Cycle orchestrator for multi-backend collection and enrichment",
    version,
    long_about = "conductor repeatedly drives collection, identity resolution and enrichment \
                  for every configured backend. Backends run concurrently within a phase; \
                  phases and cycles run one after another."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run cycles until interrupted",
        long_about = "Runs cycles forever, reloading the configuration each time. \
                      Ctrl-C stops the loop between phases or during the sleep.\n\n\
                      Examples:\n  \
                      conductor run -c conductor.toml\n  \
                      conductor run -c conductor.toml --dry-run"
    )]
    Run(RunArgs),

    #[command(about = "Run a single cycle and exit")]
    Once(OnceArgs),

    #[command(
        about = "Check that the stores needed by enabled phases are reachable",
        long_about = "Performs only the access check of a cycle.\n\n\
                      Examples:\n  \
                      conductor check -c conductor.toml"
    )]
    Check(CheckArgs),

    #[command(about = "Show targets grouped by backend")]
    Targets(TargetsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArg {
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Settings file (defaults to $CONDUCTOR_CONFIG)"
    )]
    pub path: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    #[arg(long, help = "Log pipeline calls instead of running them")]
    pub dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct OnceArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    #[arg(long, help = "Log pipeline calls instead of running them")]
    pub dry_run: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Report format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArg,
}

#[derive(Parser, Debug, Clone)]
pub struct TargetsArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
