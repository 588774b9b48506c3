mod auth;
mod database;
mod server;
mod stream;

pub use auth::*;
pub use database::*;
pub use server::*;
pub use stream::*;

use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "/var/lib/fleetwatch/config.toml";

/// Plain environment variables honoured for deployments that predate the
/// `FLEETWATCH__` prefix. They only fill in values nothing else provides.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("auth.jwt_secret", "JWT_SECRET"),
    ("auth.device_api_key", "DEVICE_API"),
    ("server.port", "PORT"),
];

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FleetwatchConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub stream: StreamConfig,
}

impl FleetwatchConfig {
    pub fn config_path() -> String {
        env::var("FLEETWATCH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &str) -> Result<Self> {
        debug!("FLEETWATCH_CONFIG => {}", config_path);

        let mut builder = Config::builder();
        for (key, var) in LEGACY_ENV {
            if let Ok(value) = env::var(var) {
                builder = builder
                    .set_default(*key, value)
                    .with_context(|| format!("applying {var}"))?;
            }
        }

        let settings = builder
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("FLEETWATCH").separator("__"))
            .build()
            .context("loading configuration")?;

        settings
            .try_deserialize::<Self>()
            .context("parsing configuration")
    }

    pub fn validate(&self) -> Result<()> {
        self.auth.validate()?;
        if self.stream.poll_interval.is_zero() {
            anyhow::bail!("[stream] poll_interval must be greater than zero");
        }
        if self.stream.chart_window == 0 {
            anyhow::bail!("[stream] chart_window must be greater than zero");
        }
        Ok(())
    }

    pub async fn db_pool(&self) -> Result<PgPool> {
        PgPoolOptions::new()
            .max_connections(self.database.max_connections)
            .connect(&self.database.to_url())
            .await
            .context("connecting to database")
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_stream(mut self, stream: StreamConfig) -> Self {
        self.stream = stream;
        self
    }
}
