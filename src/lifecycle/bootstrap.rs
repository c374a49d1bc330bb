//! Startup orchestration.
//!
//! # Responsibilities
//! - Wait for the datastore, then launch the service, in that order
//! - Drive the state machine through every step
//! - Turn any failure into a terminal `Failed` state
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Parameters are validated before the wait begins, so the waiter polls
//!   exactly the database target the starter will use
//! - The launch step is `FnOnce`: it runs at most once, and only after `Ready`

use std::future::Future;

use crate::config::ServerConfig;
use crate::error::BootstrapError;
use crate::lifecycle::state::{BootstrapState, StateMachine};
use crate::lifecycle::Shutdown;
use crate::net::Probe;
use crate::readiness::{Clock, WaitOutcome, Waiter};
use crate::service::{start_service, RawStartupArgs, RunningService, ServiceStartupConfig};

/// Wait-then-start flow for a single process.
pub struct Bootstrap<P, C> {
    waiter: Waiter<P, C>,
    machine: StateMachine,
}

impl<P: Probe, C: Clock> Bootstrap<P, C> {
    pub fn new(waiter: Waiter<P, C>) -> Self {
        Self {
            waiter,
            machine: StateMachine::waiting(),
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.machine.state()
    }

    pub fn history(&self) -> &[BootstrapState] {
        self.machine.history()
    }

    /// Wait for `config.db_target()`, then call `launch` with the config.
    pub async fn run<F, Fut, T>(&mut self, config: ServiceStartupConfig, launch: F) -> Result<T, BootstrapError>
    where
        F: FnOnce(ServiceStartupConfig) -> Fut,
        Fut: Future<Output = Result<T, BootstrapError>>,
    {
        let outcome: WaitOutcome = match self.waiter.wait_for(config.db_target()).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.machine.fail(e)),
        };
        tracing::debug!(attempts = outcome.attempts, "Datastore wait finished");

        self.machine.transition(BootstrapState::Ready)?;
        self.machine.transition(BootstrapState::Starting)?;

        match launch(config).await {
            Ok(running) => {
                self.machine.transition(BootstrapState::Running)?;
                Ok(running)
            }
            Err(e) => Err(self.machine.fail(e)),
        }
    }
}

/// Start the service after an external wait (the standalone starter).
///
/// Enters at `Ready`; parameter validation happens in `Starting`, so a bad
/// parameter fails before any bind.
pub async fn start_from_args(
    raw: &RawStartupArgs,
    server: &ServerConfig,
    shutdown: &Shutdown,
) -> Result<RunningService, BootstrapError> {
    let mut machine = StateMachine::ready();
    machine.transition(BootstrapState::Starting)?;

    let config = match ServiceStartupConfig::from_raw(raw) {
        Ok(config) => config,
        Err(e) => return Err(machine.fail(e)),
    };

    match start_service(config, server, shutdown).await {
        Ok(running) => {
            machine.transition(BootstrapState::Running)?;
            Ok(running)
        }
        Err(e) => Err(machine.fail(e)),
    }
}
