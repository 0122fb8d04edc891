//! Process lifecycle.

use std::sync::Arc;

use anyhow::Context;
use relaypanel_hardware::{DeviceManager, ManagerConfig};
use relaypanel_storage::{Database, DatabaseConfig, SqliteLabelStore, default_database_path};
use relaypanel_tv::AdbClient;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::http::{self, AppState, static_files};
use crate::startup::{connect_devices, dialers_for, load_labels};
use crate::status::{STATUS_INTERVAL, spawn_status_reporter};

/// Run the server until Ctrl-C.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let database_path = config
        .database_path
        .clone()
        .unwrap_or_else(default_database_path);
    let database = Database::new(DatabaseConfig::new(&database_path).auto_migrate(true))
        .await
        .with_context(|| format!("failed to open database {}", database_path.display()))?;
    let labels = SqliteLabelStore::new(database.pool().clone());

    let devices = DeviceManager::new(ManagerConfig::default());
    load_labels(&devices, &labels)
        .await
        .context("failed to load relay labels")?;

    connect_devices(&devices, dialers_for(&config.mode))
        .await
        .with_context(|| format!("failed to connect devices in {} mode", config.mode.as_str()))?;

    let shutdown = CancellationToken::new();
    let reporter = spawn_status_reporter(devices.clone(), STATUS_INTERVAL, shutdown.clone());

    let state = Arc::new(AppState {
        devices: devices.clone(),
        labels,
        tv: Some(AdbClient::new(config.adb.clone())),
        static_dir: config
            .static_dir
            .clone()
            .unwrap_or_else(static_files::default_static_dir),
    });

    let listener = TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.http_addr))?;
    info!(addr = %config.http_addr, mode = config.mode.as_str(), "server listening");

    let served = axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await;

    shutdown.cancel();
    let _ = reporter.await;
    devices.shutdown();
    database.close().await;

    served.context("http server error")?;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("shutdown requested"),
            Err(e) => {
                warn!(error = %e, "cannot listen for ctrl-c");
                shutdown.cancelled().await;
            }
        },
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}
