//! HTTP surface of the started service.
//!
//! # Data Flow
//! ```text
//! bound TcpListener
//!     → server.rs (Axum router, trace + timeout layers)
//!     → /health, /v1/status
//! ```

pub mod server;

pub use server::{HttpServer, ServiceStatus};
