use conductor::cli::commands::{CliArgs, Commands};
use conductor::cli::handlers::{handle_check, handle_once, handle_run, handle_targets};
use conductor::util::logging;
use conductor::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("conductor v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Run(run_args) => handle_run(run_args).await,
        Commands::Once(once_args) => handle_once(once_args).await,
        Commands::Check(check_args) => handle_check(check_args).await,
        Commands::Targets(targets_args) => handle_targets(targets_args).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = logging::config_from_env();

    if let Some(level_str) = &args.log_level {
        config.level = logging::parse_level_or_default(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    logging::init_logging(config);
}
