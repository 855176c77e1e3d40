use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use orders_api::api::DOCS_PATH;
use orders_api::config::AppConfig;
use orders_api::database::DatabaseManager;
use orders_api::{app, AppState};

#[derive(Parser)]
#[command(name = "orders-api")]
#[command(about = "API-key gated orders and records service")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Listening port (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Load environment from this file instead of ./.env")]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load .env if present so cargo run picks up API_KEY, DATABASE_URL, etc.
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path).with_context(|| format!("failed to load {}", path.display()))?;
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orders_api=info,tower_http=info")),
        )
        .init();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    tracing::info!("Starting Orders API in {:?} mode", config.environment);

    let database = DatabaseManager::connect(&config.database).context("invalid database configuration")?;
    let state = AppState::new(config.clone(), Arc::new(database.clone()));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Orders API listening on http://{}", bind_addr);
    tracing::info!("Swagger docs available at {}{}", config.docs.base_url, DOCS_PATH);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = until_signal("Ctrl-C", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Resolves when `signal` fires. A handler that cannot be installed never
/// resolves, so it cannot trigger a shutdown on its own.
async fn until_signal<F>(name: &str, signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!("failed to listen for {}: {}", name, e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn failed_signal_handler_does_not_shut_down() {
        let failing = async { Err(std::io::Error::new(std::io::ErrorKind::Other, "no handler")) };
        let waited = tokio::time::timeout(Duration::from_millis(50), until_signal("test", failing)).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn delivered_signal_resolves() {
        let delivered = async { Ok(()) };
        let waited = tokio::time::timeout(Duration::from_millis(50), until_signal("test", delivered)).await;
        assert!(waited.is_ok());
    }
}
