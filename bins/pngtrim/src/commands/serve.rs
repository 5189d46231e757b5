//! `pngtrim serve`

use anyhow::Context;
use pngtrim_core::config::Config;
use pngtrim_server::{router, AppState};
use pngtrim_telemetry::TelemetryConfig;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Load configuration, bind, and serve until Ctrl-C.
pub async fn run(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = Config::load(config_path)?;
    if let Some(host) = host {
        config.schema.server.host = host;
    }
    if let Some(port) = port {
        config.schema.server.port = port;
    }

    pngtrim_telemetry::init_with_config(TelemetryConfig::from(&config.schema.logging))?;
    match &config.path {
        Some(path) => info!(path = %path.display(), "Loaded configuration"),
        None => info!("No configuration file found, using defaults"),
    }

    let schema = &config.schema;
    let app = router(Arc::new(AppState::from_config(schema)));

    let addr = schema.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        %addr,
        packaging = %schema.packaging.mode,
        concurrency = schema.processing.concurrency,
        max_body_bytes = schema.server.max_body_bytes,
        "pngtrim listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested, draining connections");
}
