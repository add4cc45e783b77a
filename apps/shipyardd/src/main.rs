//! Shipyard daemon.

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use shipyard_build_store::BuildStore;
use shipyard_releases::ReleaseManager;
use shipyard_server::{AppState, create_router};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "shipyardd", version, about = "Game build deployment and release daemon")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SHIPYARD_CONFIG")]
    config: Option<PathBuf>,

    /// Root directory holding the games, overrides `root_dir`
    #[arg(long, env = "SHIPYARD_ROOT")]
    root: Option<PathBuf>,

    /// Listen address, overrides `listen`
    #[arg(short, long, env = "SHIPYARD_LISTEN")]
    listen: Option<SocketAddr>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "SHIPYARD_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "SHIPYARD_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(root) = cli.root {
        config.root_dir = root;
    }
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    config.validate()?;

    std::fs::create_dir_all(&config.root_dir)
        .with_context(|| format!("failed to create {}", config.root_dir.display()))?;

    let store = Arc::new(
        BuildStore::new(&config.root_dir).with_retention(config.deployments_to_keep),
    );
    let releases = ReleaseManager::new(store)
        .with_releases_to_keep(config.releases_to_keep)
        .with_default_environments(config.default_environments.clone());
    let app = create_router(AppState::new(releases));

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    tracing::info!(
        listen = %listener.local_addr()?,
        root = %config.root_dir.display(),
        "shipyardd listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shipyardd stopped");
    Ok(())
}

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
