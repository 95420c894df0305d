use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use image_api::Settings;
use image_api::logging;
use image_api::rest::{AppState, create_router};

#[derive(Parser)]
#[command(name = "image-api")]
#[command(about = "Unified image API for containerd and Harbor")]
struct Args {
    /// JSON configuration file (defaults are used if missing)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Listen address, overrides app_config.host and app_config.port
    #[arg(short, long)]
    listen: Option<String>,

    /// Log filter, overrides app_config.log_level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (settings, load_error) = match Settings::try_load(&args.config) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| settings.app_config.log_level.clone());
    let _log_guard = logging::init(&settings.app_config, &level)?;

    match load_error {
        None => info!(config = %args.config.display(), "Configuration loaded"),
        Some(e) => warn!(error = %e, "Using default configuration"),
    }

    let listen = args
        .listen
        .unwrap_or_else(|| settings.app_config.listen_addr());
    let settings = Arc::new(settings);
    let router = create_router(Arc::new(AppState::new(settings)));

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("Failed to bind {}", listen))?;
    info!("Starting image API on {}", listen);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = signal::ctrl_c();
    let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(_) => {
            let _ = ctrl_c.await;
            info!("Received SIGINT");
            return;
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = sigterm.recv() => info!("Received SIGTERM"),
    }
}
