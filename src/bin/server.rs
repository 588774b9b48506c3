use anyhow::Context;
use clap::Parser;
use fleetwatch::{
    models::config::FleetwatchConfig,
    server::{AppState, run},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Live telemetry feeds and device ingestion for the fleet dashboard
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to config.toml (overrides FLEETWATCH_CONFIG)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()) // uses RUST_LOG
        .init();

    let args = Args::parse();
    info!("Fleetwatch: Starting...");

    let cfg = match args.config.as_deref() {
        Some(path) => FleetwatchConfig::load_from(path)?,
        None => FleetwatchConfig::load()?,
    };
    cfg.validate().context("invalid configuration")?;

    debug!("======== INITIALIZING DATABASE ========");
    let pool = cfg.db_pool().await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("running migrations")?;

    info!("Poll interval: {:?}", cfg.stream.poll_interval);
    info!("Chart window: {}", cfg.stream.chart_window);
    if !cfg.stream.recheck_expiry {
        info!("Token expiry is only checked when a feed is opened");
    }

    run(AppState::new(pool, cfg)).await
}
