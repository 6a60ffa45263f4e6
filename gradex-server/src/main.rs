use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gradex_config::ConfigLoader;
use gradex_core::{Dispatcher, PostgresExecutorStore, RequestCrypto};
use gradex_server::{AppState, create_api_router};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "gradex-server")]
#[command(about = "Autograding dispatch server for the Gradex LMS")]
struct Cli {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// PostgreSQL connection URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let load = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;
    let mut config = load.config;

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(url) = cli.database_url {
        config.database.url = Some(url);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    for warning in &load.warnings {
        warn!(message = %warning.message, "configuration warning");
    }

    let database_url = config
        .database
        .url
        .clone()
        .context("DATABASE_URL must be provided for PostgreSQL connections")?;

    let store = PostgresExecutorStore::connect(&database_url)
        .await
        .context("failed to connect to PostgreSQL")?;
    store
        .bootstrap_schema()
        .await
        .context("failed to bootstrap the executor schema")?;
    let store = Arc::new(store);

    let crypto = Arc::new(
        RequestCrypto::new(
            config.grading.psk.as_bytes(),
            config.grading.allowed_skew_secs,
        )
        .context("invalid pre-shared key")?,
    );

    let dispatcher = Arc::new(Dispatcher::new(
        store.clone(),
        crypto.clone(),
        Duration::from_secs(config.grading.executor_timeout_secs),
    ));

    info!(
        grading.allowed_skew_secs = config.grading.allowed_skew_secs,
        grading.executor_timeout_secs = config.grading.executor_timeout_secs,
        "dispatch configuration in effect"
    );

    let state = AppState::new(store, dispatcher, crypto);
    let router = create_api_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server host/port")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to install shutdown signal handler");
        return;
    }
    info!("shutdown signal received");
}
