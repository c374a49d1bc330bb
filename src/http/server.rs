//! HTTP server for the started service.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request timeout)
//! - Serve on an already-bound listener until shutdown
//!
//! # Routes
//! - `GET /health`: liveness, always `ok` while the process serves
//! - `GET /v1/status`: bootstrap outcome and database wiring (no password)

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::lifecycle::state::BootstrapState;
use crate::service::config::ServiceStartupConfig;
use crate::service::database::DatabaseUrl;

/// Snapshot returned by `/v1/status`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub state: &'static str,
    pub bind: String,
    pub database: DatabaseStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub url: String,
}

impl ServiceStatus {
    pub fn new(config: &ServiceStartupConfig, db_url: &DatabaseUrl) -> Self {
        Self {
            state: BootstrapState::Running.as_str(),
            bind: config.bind_target().to_string(),
            database: DatabaseStatus {
                host: config.db_target().host().to_string(),
                port: config.db_target().port(),
                name: config.db_name().to_string(),
                user: config.db_user().to_string(),
                url: db_url.redacted(),
            },
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub status: Arc<ServiceStatus>,
}

/// HTTP server for the started service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(status: ServiceStatus, config: &ServerConfig) -> Self {
        let state = AppState {
            status: Arc::new(status),
        };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/v1/status", get(status_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn status_handler(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(state.status.as_ref().clone())
}
