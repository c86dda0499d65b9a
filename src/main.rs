use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use media_compressor::app;
use media_compressor::config::settings::AppConfig;
use media_compressor::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("media_compressor=info,tower_http=info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter)
        .init();

    info!("Starting server...");

    let config = AppConfig::new();
    tokio::fs::create_dir_all(&config.temp_dir)
        .await
        .with_context(|| format!("creating temp dir {}", config.temp_dir.display()))?;
    info!(
        temp_dir = %config.temp_dir.display(),
        ffmpeg = %config.ffmpeg_path.display(),
        max_video_bytes = config.max_video_bytes,
        "Loaded configuration"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let state = AppState::with_ffmpeg(config);
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
