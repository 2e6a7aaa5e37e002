// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `outlet serve` command implementation.
//!
//! Opens SQLite storage, selects the reply generator and notification sink
//! from configuration, builds the session orchestrator and serves the HTTP
//! gateway until SIGINT or SIGTERM.

use std::sync::Arc;

use outlet_config::OutletConfig;
use outlet_core::{OutletError, PluginAdapter, StorageAdapter};
use outlet_gateway::{GatewayState, ServerConfig};
use outlet_session::{Limits, SessionOrchestrator};
use outlet_storage::SqliteStorage;
use tracing::{info, warn};

use crate::shutdown;

pub async fn run_serve(config: OutletConfig) -> Result<(), OutletError> {
    init_tracing(&config.service.log_level);

    info!(name = %config.service.name, "starting outlet serve");

    let storage = open_storage(&config).await?;
    let orchestrator = Arc::new(build_orchestrator(&config, Arc::clone(&storage))?);

    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token is not set -- every API request will be rejected");
    }

    let cancel = shutdown::install_signal_handler();
    let state = GatewayState::new(Arc::clone(&orchestrator), config.gateway.bearer_token.clone());
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    let shutdown_signal = {
        let cancel = cancel.clone();
        async move { cancel.cancelled().await }
    };

    let served = outlet_gateway::start_server(&server_config, state, shutdown_signal).await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage close failed");
    }
    served?;

    info!("outlet serve shutdown complete");
    Ok(())
}

async fn open_storage(config: &OutletConfig) -> Result<Arc<dyn StorageAdapter>, OutletError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "storage ready");
    Ok(Arc::new(storage))
}

/// Wire the orchestrator's collaborators from configuration.
fn build_orchestrator(
    config: &OutletConfig,
    storage: Arc<dyn StorageAdapter>,
) -> Result<SessionOrchestrator, OutletError> {
    let replies = outlet_reply::from_config(&config.reply)?;
    let notifier = outlet_session::notify::from_config(config.notify.sink, Arc::clone(&storage));
    info!(
        reply = replies.name(),
        notify = notifier.name(),
        "collaborators selected"
    );
    Ok(SessionOrchestrator::new(
        storage,
        replies,
        notifier,
        Limits::from(&config.limits),
    ))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("outlet={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
