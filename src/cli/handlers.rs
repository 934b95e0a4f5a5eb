//! Command handlers; each returns the process exit code

use super::commands::{CheckArgs, ConfigArg, OnceArgs, RunArgs, TargetsArgs};
use super::output::OutputFormatter;
use crate::backends::BackendRegistry;
use crate::config::{resolve_config_path, Config, ConfigError, FileConfigSource};
use crate::pipeline::{
    group_targets_by_backend, CommandExecutor, CycleController, DryRunExecutor, PhaseRunner,
    PipelineExecutor,
};
use crate::progress::{LoggingHandler, ProgressHandler};
use crate::storage::{HttpStoreProbe, StoreProbe};
use std::fmt::Display;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const EXIT_OK: i32 = 0;
pub const EXIT_ACCESS: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;

fn report_fatal(err: &dyn Display) {
    eprintln!("Error: {}", err);
}

/// Reads the configuration once up front so bad settings fail fast
fn load_initial(arg: &ConfigArg) -> Result<(FileConfigSource, Config), ConfigError> {
    let path = resolve_config_path(arg.path.as_deref())?;
    let source = FileConfigSource::new(path);
    let config = Config::load(source.path())?;
    debug!("{}", config);
    Ok((source, config))
}

fn select_executor(config: &Config, dry_run: bool) -> Arc<dyn PipelineExecutor> {
    if dry_run {
        info!("Dry run: pipeline calls are logged, not executed");
        return Arc::new(DryRunExecutor);
    }
    match CommandExecutor::from_config(config) {
        Some(executor) => Arc::new(executor),
        None => {
            warn!("No [executor] program configured, falling back to dry run");
            Arc::new(DryRunExecutor)
        }
    }
}

fn build_controller(
    source: FileConfigSource,
    config: &Config,
    dry_run: bool,
    cancel: CancellationToken,
) -> CycleController {
    let progress: Arc<dyn ProgressHandler> = Arc::new(LoggingHandler);
    let runner = PhaseRunner::new(
        Arc::new(BackendRegistry::with_defaults()),
        select_executor(config, dry_run),
        Arc::clone(&progress),
    );
    CycleController::new(
        Arc::new(source),
        Arc::new(HttpStoreProbe::new()),
        runner,
        progress,
    )
    .with_cancellation(cancel)
}

pub async fn handle_run(args: &RunArgs) -> i32 {
    let (source, config) = match load_initial(&args.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            report_fatal(&e);
            return EXIT_CONFIG;
        }
    };

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping after the current phase");
            signal_token.cancel();
        }
    });

    info!(config = %source.path().display(), "Starting conductor");
    let controller = build_controller(source, &config, args.dry_run, cancel);
    match controller.run().await {
        Ok(()) => EXIT_OK,
        Err(e) => {
            report_fatal(&e);
            EXIT_ACCESS
        }
    }
}

pub async fn handle_once(args: &OnceArgs) -> i32 {
    let (source, config) = match load_initial(&args.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            report_fatal(&e);
            return EXIT_CONFIG;
        }
    };

    let controller = build_controller(source, &config, args.dry_run, CancellationToken::new());
    let report = match controller.run_cycle().await {
        Ok(report) => report,
        Err(e) => {
            report_fatal(&e);
            return EXIT_ACCESS;
        }
    };

    match OutputFormatter::new(args.format.into()).format_cycle(&report) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            report_fatal(&format!("{:#}", e));
            return EXIT_CONFIG;
        }
    }

    if report.config_error.is_some() {
        EXIT_CONFIG
    } else {
        EXIT_OK
    }
}

pub async fn handle_check(args: &CheckArgs) -> i32 {
    let (_, config) = match load_initial(&args.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            report_fatal(&e);
            return EXIT_CONFIG;
        }
    };

    let probe = HttpStoreProbe::new();
    let stores = crate::storage::required_stores(&config);
    if stores.is_empty() {
        println!("No phase enabled, no store to check");
        return EXIT_OK;
    }

    for (store, url) in stores {
        if let Err(e) = probe.probe(store, url).await {
            report_fatal(&e);
            return EXIT_ACCESS;
        }
        println!("Store for {} reachable at {}", store, url);
    }
    EXIT_OK
}

pub async fn handle_targets(args: &TargetsArgs) -> i32 {
    let (_, config) = match load_initial(&args.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            report_fatal(&e);
            return EXIT_CONFIG;
        }
    };

    let groups = group_targets_by_backend(&config, &BackendRegistry::with_defaults());
    match OutputFormatter::new(args.format.into()).format_groups(&groups) {
        Ok(output) => {
            println!("{}", output);
            EXIT_OK
        }
        Err(e) => {
            report_fatal(&format!("{:#}", e));
            EXIT_CONFIG
        }
    }
}
