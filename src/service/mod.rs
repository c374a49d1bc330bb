//! Service starter subsystem.
//!
//! # Data Flow
//! ```text
//! RawStartupArgs (CLI)
//!     → config.rs (presence & shape checks → ServiceStartupConfig)
//!     → database.rs (DatabaseUrl)
//!     → starter.rs (bind listener, spawn HTTP server)
//!     → RunningService
//! ```

pub mod config;
pub mod database;
pub mod starter;

pub use config::{RawStartupArgs, ServiceStartupConfig};
pub use database::DatabaseUrl;
pub use starter::{start_service, RunningService};
