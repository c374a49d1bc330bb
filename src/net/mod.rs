//! Network foundation.
//!
//! # Data Flow
//! ```text
//! Readiness wait:
//!     target.rs (validated host/port)
//!     → probe.rs (TCP connect or MySQL greeting)
//!
//! Service start:
//!     target.rs (bind host/port)
//!     → listener.rs (resolve, SO_REUSEADDR, listen)
//! ```

pub mod listener;
pub mod probe;
pub mod target;

pub use probe::{MysqlProbe, Probe, TargetProbe, TcpProbe};
pub use target::ConnectionTarget;
