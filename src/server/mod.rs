use crate::auth::CredentialVerifier;
use crate::handlers::{devices, status::status, ws};
use crate::models::config::FleetwatchConfig;
use crate::stream::{PgSnapshotSource, Publisher, PublisherSettings};
use anyhow::{Context, Result};
use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    config: Arc<FleetwatchConfig>,
    publisher: Arc<Publisher<PgSnapshotSource>>,
}

impl AppState {
    pub fn new(pool: PgPool, config: FleetwatchConfig) -> Self {
        let source = Arc::new(PgSnapshotSource::new(
            pool.clone(),
            config.stream.chart_window,
        ));
        let publisher = Publisher::new(
            source,
            CredentialVerifier::new(&config.auth.jwt_secret),
            PublisherSettings::from(&config.stream),
        );

        Self {
            pool,
            config: Arc::new(config),
            publisher: Arc::new(publisher),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &FleetwatchConfig {
        &self.config
    }

    pub fn device_api_key(&self) -> &str {
        &self.config.auth.device_api_key
    }

    pub fn publisher(&self) -> &Publisher<PgSnapshotSource> {
        &self.publisher
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> PgPool {
        state.pool.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/api/sensor/data", post(devices::sensor_data))
        .route("/api/cooler/data", post(devices::cooler_data))
        .fallback(ws::subscribe)
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn run(state: AppState) -> Result<()> {
    let address = state.config().server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;

    info!("✅ Listening on http://{address} (ws://{address}/<topic>?token=...)");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("✅ Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal, stopping server..."),
        Err(e) => warn!("failed to listen for Ctrl-C: {e}"),
    }
}
