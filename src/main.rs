//! `refset-sync` binary entry point.
//!
//! Exit codes: 0 success, 1 configuration or bootstrap failure, 2 inventory
//! unreadable, 3 remote listing failed, 4 one or more sets failed to sync.

mod cli;

use clap::Parser;
use cli::Cli;
use core_async::sync::CancellationToken;
use core_runtime::logging::init_logging;
use core_service::{CoreError, SyncService};
use std::process::ExitCode;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.logging_config()) {
        eprintln!("refset-sync: {}", e);
        return ExitCode::from(1);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(exit_code = e.exit_code(), "{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), CoreError> {
    let config = cli.app_config()?;
    let service = SyncService::new(config)?;

    let runtime = core_async::runtime::build_multi_thread("refset-sync")
        .map_err(|e| CoreError::Runtime(format!("Failed to start async runtime: {}", e)))?;

    runtime.block_on(sync_once(service))
}

async fn sync_once(service: SyncService) -> Result<(), CoreError> {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    core_async::spawn(async move {
        if core_async::runtime::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding units");
            on_signal.cancel();
        }
    });

    let summary = service.run_with_token(token).await?;
    match summary.report {
        Some(report) => info!(run_id = %summary.run_id, "{}", report),
        None => info!(
            run_id = %summary.run_id,
            planned = summary.plan.len(),
            "Dry run finished"
        ),
    }
    Ok(())
}
