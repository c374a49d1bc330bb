//! `wait-for-db`: block until a host/port accepts connections, then
//! optionally exec a follow-up command.

use std::process::ExitCode;

use clap::Parser;

use server_bootstrap::cli::{report, resolve_config, WaitForDbCli, EXIT_INTERRUPTED};
use server_bootstrap::lifecycle::handoff;
use server_bootstrap::lifecycle::signals::shutdown_signal;
use server_bootstrap::observability;
use server_bootstrap::{wait_for_target, BootstrapConfig, BootstrapError, ConnectionTarget};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = WaitForDbCli::parse();

    let config = match resolve_config(&cli.config, Some(&cli.wait)) {
        Ok(config) => config,
        Err(e) => {
            observability::logging::init_logging(&BootstrapConfig::default().observability);
            return report(&e);
        }
    };
    observability::init(&config.observability);

    match run(&cli, &config).await {
        Some(Ok(())) => ExitCode::SUCCESS,
        Some(Err(e)) => report(&e),
        None => ExitCode::from(EXIT_INTERRUPTED),
    }
}

/// `None` when a signal interrupted the wait.
async fn run(cli: &WaitForDbCli, config: &BootstrapConfig) -> Option<Result<(), BootstrapError>> {
    let target = match ConnectionTarget::parse("--host", cli.host.as_deref(), "--port", cli.port.as_deref()) {
        Ok(target) => target,
        Err(e) => return Some(Err(e)),
    };

    // Reject a blank command before spending the wait budget.
    let argv = match cli.command.as_deref().map(handoff::split_command).transpose() {
        Ok(argv) => argv,
        Err(e) => return Some(Err(e)),
    };

    let waited = tokio::select! {
        result = wait_for_target(&target, &config.wait) => result,
        _ = shutdown_signal() => {
            tracing::warn!(target = %target, "Interrupted while waiting");
            return None;
        }
    };
    if let Err(e) = waited {
        return Some(Err(e));
    }

    match argv {
        Some(argv) => Some(Err(handoff::exec(&argv))),
        None => Some(Ok(())),
    }
}
