//! Service starter.
//!
//! # Responsibilities
//! - Derive the database URL from validated parameters
//! - Bind the service listener (a bind failure is a startup error)
//! - Spawn the HTTP server and hand back a handle
//!
//! # Design Decisions
//! - Fail fast: nothing is spawned unless the listener is bound
//! - Once spawned the server owns its lifecycle; shutdown arrives through
//!   the broadcast coordinator

use std::io;
use std::net::SocketAddr;

use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::error::BootstrapError;
use crate::http::{HttpServer, ServiceStatus};
use crate::lifecycle::Shutdown;
use crate::net::listener;
use crate::service::config::ServiceStartupConfig;
use crate::service::database::DatabaseUrl;

/// A service that has bound its port and is serving.
#[derive(Debug)]
pub struct RunningService {
    local_addr: SocketAddr,
    database: DatabaseUrl,
    handle: JoinHandle<io::Result<()>>,
}

impl RunningService {
    /// Address the listener actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn database(&self) -> &DatabaseUrl {
        &self.database
    }

    /// Wait until the server stops.
    pub async fn wait(self) -> Result<(), BootstrapError> {
        let context = format!("serve {}", self.local_addr);
        match self.handle.await {
            Ok(result) => result.map_err(|e| BootstrapError::startup(context, e)),
            Err(join) => Err(BootstrapError::startup(context, io::Error::from(join))),
        }
    }
}

/// Start the service described by `config`.
///
/// Must be called from within a Tokio runtime. The server stops when
/// `shutdown` is triggered or dropped.
pub async fn start_service(
    config: ServiceStartupConfig,
    server: &ServerConfig,
    shutdown: &Shutdown,
) -> Result<RunningService, BootstrapError> {
    let database = DatabaseUrl::from_config(&config)?;

    tracing::info!(
        bind = %config.bind_target(),
        database = %database,
        "Starting service"
    );

    let listener = listener::bind(config.bind_target()).await?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| BootstrapError::startup(format!("bind {}", config.bind_target()), e))?;

    let http = HttpServer::new(ServiceStatus::new(&config, &database), server);
    let handle = tokio::spawn(http.run(listener, shutdown.subscribe()));

    Ok(RunningService {
        local_addr,
        database,
        handle,
    })
}
