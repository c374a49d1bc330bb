//! Readiness waiting subsystem.
//!
//! # Data Flow
//! ```text
//! waiter.rs
//!     → net::probe (one attempt, bounded by a deadline)
//!     → on failure: resilience::backoff (next delay)
//!     → clock.rs (sleep)
//!     → repeat until ready or the budget is spent
//! ```

pub mod clock;
pub mod waiter;

pub use clock::{Clock, ManualClock, TokioClock};
pub use waiter::{wait_for_target, WaitOutcome, WaitPolicy, Waiter};
