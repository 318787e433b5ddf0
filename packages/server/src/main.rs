use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemAssetStore;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ozinshe_server::config::{AppConfig, Platform};
use ozinshe_server::state::AppState;
use ozinshe_server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal outside local development.
    let _ = dotenvy::dotenv();

    let config = AppConfig::load().context("failed to load configuration")?;

    let default_filter = match config.platform {
        Platform::Dev => "info,ozinshe_server=debug,tower_http=debug",
        Platform::Hosted => "info",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = database::init_db(&config.database.url, config.platform)
        .await
        .context("failed to initialize database")?;
    seed::seed_roles(&db).await.context("failed to seed roles")?;
    seed::seed_admin(&db, &config.auth).await?;

    let images = FilesystemAssetStore::new(
        config.storage.images_dir.clone(),
        config.storage.max_image_size,
    )
    .await
    .context("failed to prepare image directory")?;
    let videos = FilesystemAssetStore::new(
        config.storage.videos_dir.clone(),
        config.storage.max_video_size,
    )
    .await
    .context("failed to prepare video directory")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid listen address")?;

    let state = AppState {
        db,
        config,
        images: Arc::new(images),
        videos: Arc::new(videos),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
