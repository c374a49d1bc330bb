//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (bootstrap.rs):
//!     Validate parameters → Wait for datastore → Bind listener → Serve
//!
//! State (state.rs):
//!     Waiting → Ready → Starting → Running, or Failed
//!
//! Hand-off (handoff.rs):
//!     wait-for-db -c → exec follow-up command
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → broadcast → HTTP server drains → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: parameters first, then datastore, then listener
//! - No internal restart; the orchestrator's restart policy owns that

pub mod bootstrap;
pub mod handoff;
pub mod shutdown;
pub mod signals;
pub mod state;

pub use bootstrap::{start_from_args, Bootstrap};
pub use shutdown::Shutdown;
pub use state::{BootstrapState, StateMachine};
