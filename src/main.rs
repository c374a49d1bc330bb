//! `server-bootstrap`: wait for the database, then start the server, in one
//! process.
//!
//! Replaces `wait_for_db.py ... -c 'starter.py ...'` with two explicit calls:
//! the readiness wait on the database target, followed by the service start.

use std::process::ExitCode;

use clap::Parser;

use server_bootstrap::cli::{report, resolve_config, BootstrapCli, EXIT_INTERRUPTED};
use server_bootstrap::lifecycle::signals::shutdown_signal;
use server_bootstrap::net::TargetProbe;
use server_bootstrap::observability;
use server_bootstrap::readiness::{TokioClock, WaitPolicy};
use server_bootstrap::{start_service, Bootstrap, BootstrapConfig, ServiceStartupConfig, Shutdown, Waiter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = BootstrapCli::parse();

    let config = match resolve_config(&cli.config, Some(&cli.wait)) {
        Ok(config) => config,
        Err(e) => {
            observability::logging::init_logging(&BootstrapConfig::default().observability);
            return report(&e);
        }
    };
    observability::init(&config.observability);

    tracing::info!("server-bootstrap v{} starting", env!("CARGO_PKG_VERSION"));

    // Validate every parameter before waiting on the database.
    let startup = match ServiceStartupConfig::from_raw(&cli.startup) {
        Ok(startup) => startup,
        Err(e) => return report(&e),
    };

    let waiter = Waiter::new(
        TargetProbe::from(config.wait.probe),
        TokioClock,
        WaitPolicy::from(&config.wait),
    );
    let mut bootstrap = Bootstrap::new(waiter);
    let shutdown = Shutdown::new();

    let running = tokio::select! {
        result = bootstrap.run(startup, |startup| start_service(startup, &config.server, &shutdown)) => result,
        _ = shutdown_signal() => {
            tracing::warn!(state = %bootstrap.state(), "Interrupted before the service was running");
            return ExitCode::from(EXIT_INTERRUPTED);
        }
    };

    let running = match running {
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
