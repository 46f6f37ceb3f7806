//! adpulse-api: metrics HTTP API server

use adpulse_api::llm::{LlmSettings, TextGeneration, TextGenerator};
use adpulse_api::{build_router, AppState};
use adpulse_common::config::{CliOverrides, Settings};
use adpulse_common::StorageManager;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "adpulse-api")]
#[command(about = "AdPulse metrics API server")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "ADPULSE_API_HOST")]
    host: Option<String>,

    /// Port to listen on; an unparseable ADPULSE_API_PORT is ignored
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database file
    #[arg(long, env = "ADPULSE_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Directory for generated reports
    #[arg(long, env = "ADPULSE_REPORTS_DIR")]
    reports_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting AdPulse API v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let settings = Settings::load(&CliOverrides {
        db_path: args.db_path,
        reports_dir: args.reports_dir,
        api_host: args.host,
        api_port: args.port,
    });
    info!("Database path: {}", settings.db_path.display());

    let storage = StorageManager::open(&settings.db_path)
        .await
        .context("Failed to open database")?;
    storage
        .initialize()
        .await
        .context("Failed to initialize schema")?;

    let generator: Option<Arc<dyn TextGeneration>> =
        match TextGenerator::new(LlmSettings::from_env()) {
            Ok(generator) => {
                info!(provider = ?generator.provider(), "Text generation enabled");
                Some(Arc::new(generator))
            }
            Err(e) => {
                warn!("AI insights disabled: {}", e);
                None
            }
        };

    let state = AppState::new(storage.clone(), generator, settings.reports_dir.clone());
    let app = build_router(state);

    let bind_addr = format!("{}:{}", settings.api_host, settings.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("adpulse-api listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    storage.close().await;
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
