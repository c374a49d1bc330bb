//! Readiness-gated service bootstrap.
//!
//! Waits until a MySQL datastore accepts connections, then starts the server
//! with a validated set of connection parameters.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI flags ──▶ service::config ──▶ ServiceStartupConfig
//!                                          │ db_target()
//!                                          ▼
//!   ┌──────────────────────── lifecycle::bootstrap ────────────────────────┐
//!   │  WAITING ──▶ readiness::waiter ──▶ net::probe ──▶ db:3306             │
//!   │     │              ▲    │                                             │
//!   │     │              └────┘ resilience::backoff + clock                 │
//!   │     ▼                                                                 │
//!   │  READY ──▶ STARTING ──▶ service::starter ──▶ net::listener (12345)    │
//!   │                              │                                        │
//!   │                              ▼                                        │
//!   │                         http::server ──▶ RUNNING                      │
//!   └───────────────────────────────────────────────────────────────────────┘
//!        any failure ──▶ FAILED ──▶ non-zero exit
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod readiness;
pub mod resilience;
pub mod service;

pub use config::BootstrapConfig;
pub use error::BootstrapError;
pub use lifecycle::{Bootstrap, BootstrapState, Shutdown};
pub use net::ConnectionTarget;
pub use readiness::{wait_for_target, Waiter};
pub use service::{start_service, ServiceStartupConfig};
