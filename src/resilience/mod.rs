//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Probe attempt fails:
//!     → backoff.rs (fixed interval or exponential + jitter)
//!     → waiter sleeps, bounded by its remaining budget
//! ```
//!
//! # Design Decisions
//! - Every wait has a deadline; no unbounded retry loops
//! - Jittered backoff prevents a fleet of containers probing in lockstep

pub mod backoff;
