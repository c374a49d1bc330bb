//! `starter`: validate the seven startup parameters and launch the server.
//!
//! Expects the database to be reachable already (see `wait-for-db`).

use std::process::ExitCode;

use clap::Parser;

use server_bootstrap::cli::{report, resolve_config, StarterCli};
use server_bootstrap::lifecycle::signals::shutdown_signal;
use server_bootstrap::lifecycle::start_from_args;
use server_bootstrap::observability;
use server_bootstrap::{BootstrapConfig, Shutdown};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = StarterCli::parse();

    let config = match resolve_config(&cli.config, None) {
        Ok(config) => config,
        Err(e) => {
            observability::logging::init_logging(&BootstrapConfig::default().observability);
            return report(&e);
        }
    };
    observability::init(&config.observability);

    let shutdown = Shutdown::new();
    let running = match start_from_args(&cli.startup, &config.server, &shutdown).await {
        Ok(running) => running,
        Err(e) => return report(&e),
    };

    tracing::info!(
        address = %running.local_addr(),
        database = %running.database(),
        "Service running"
    );

    shutdown_signal().await;
    shutdown.trigger();

    match running.wait().await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}
