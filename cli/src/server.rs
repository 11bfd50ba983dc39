// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Collector HTTP server

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use fsmon_core::application::CollectorService;
use fsmon_core::domain::config::MonitorConfig;
use fsmon_core::infrastructure::InMemoryRegistry;
use fsmon_core::presentation::api::app_with_body_limit;

pub async fn start_server(config: MonitorConfig) -> Result<()> {
    config.validate().context("Configuration validation failed")?;

    info!("fsmon collector starting (PID: {})", std::process::id());

    // State lives for the process only; nothing is loaded or saved.
    let registry = Arc::new(InMemoryRegistry::with_retention_days(config.retention_days));
    let collector = Arc::new(CollectorService::new(registry));
    let app = app_with_body_limit(collector, config.max_body_bytes);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(
        retention_days = config.retention_days,
        "Collector listening on {}", addr
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server failed")?;

    info!("Collector shutting down, registry discarded");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
