//! Bootstrap state machine.
//!
//! # States
//! - Waiting: probing the datastore
//! - Ready: datastore reachable, service not yet started
//! - Starting: validating parameters and binding
//! - Running: service owns its lifecycle
//! - Failed: terminal
//!
//! # State Transitions
//! ```text
//! Waiting → Ready: target accepted a connection
//! Waiting → Failed: readiness timeout
//! Ready → Starting: starter invoked
//! Starting → Running: listener bound, serving
//! Starting → Failed: bad configuration or bind failure
//! ```
//!
//! Nothing leaves Running or Failed.

use std::fmt;
use std::io;

use crate::error::BootstrapError;
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapState {
    Waiting,
    Ready,
    Starting,
    Running,
    Failed,
}

impl BootstrapState {
    /// Stable numeric code for the state gauge.
    pub fn code(self) -> u8 {
        match self {
            BootstrapState::Waiting => 0,
            BootstrapState::Ready => 1,
            BootstrapState::Starting => 2,
            BootstrapState::Running => 3,
            BootstrapState::Failed => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BootstrapState::Waiting => "waiting",
            BootstrapState::Ready => "ready",
            BootstrapState::Starting => "starting",
            BootstrapState::Running => "running",
            BootstrapState::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BootstrapState::Running | BootstrapState::Failed)
    }

    fn can_transition_to(self, next: BootstrapState) -> bool {
        use BootstrapState::*;
        matches!(
            (self, next),
            (Waiting, Ready) | (Waiting, Failed) | (Ready, Starting) | (Starting, Running) | (Starting, Failed)
        )
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the current state and rejects illegal transitions.
#[derive(Debug)]
pub struct StateMachine {
    state: BootstrapState,
    history: Vec<BootstrapState>,
}

impl StateMachine {
    /// Start in `Waiting`, for the full wait-then-start flow.
    pub fn waiting() -> Self {
        Self::starting_at(BootstrapState::Waiting)
    }

    /// Start in `Ready`, for a starter invoked after an external wait.
    pub fn ready() -> Self {
        Self::starting_at(BootstrapState::Ready)
    }

    fn starting_at(state: BootstrapState) -> Self {
        metrics::record_state(state);
        tracing::debug!(state = %state, "Bootstrap state initialized");
        Self {
            state,
            history: vec![state],
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Every state visited, oldest first.
    pub fn history(&self) -> &[BootstrapState] {
        &self.history
    }

    /// Move to `next`. An illegal transition is reported as a startup error.
    pub fn transition(&mut self, next: BootstrapState) -> Result<(), BootstrapError> {
        if !self.state.can_transition_to(next) {
            return Err(BootstrapError::startup(
                "state machine",
                io::Error::new(
                    io::ErrorKind::Other,
                    format!("illegal transition {} -> {}", self.state, next),
                ),
            ));
        }

        tracing::info!(from = %self.state, to = %next, "Bootstrap state changed");
        self.state = next;
        self.history.push(next);
        metrics::record_state(next);
        Ok(())
    }

    /// Record a failure and hand the error back for propagation.
    pub fn fail(&mut self, err: BootstrapError) -> BootstrapError {
        if let Err(illegal) = self.transition(BootstrapState::Failed) {
            tracing::error!(error = %illegal, "Could not record failure");
        }
        tracing::error!(error = %err, "Bootstrap failed");
        err
    }
}
