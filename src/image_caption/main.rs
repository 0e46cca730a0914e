mod application;
mod domain;
mod infrastructure;

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

use application::caption_service::CaptionService;
use application::session_service::SessionService;
use infrastructure::axum_handler::{build_router, AppState};
use infrastructure::config::AppConfig;
use infrastructure::file_storage::LocalFileStorage;
use infrastructure::font::load_font;
use infrastructure::image_loader::DefaultImageLoader;
use infrastructure::image_processor::DefaultImageProcessor;

fn setup_logging() {
    use tracing_subscriber::prelude::*;

    // RUST_LOG が無ければ info、このクレートは debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,image_caption=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_level(true))
        .init();
}

// 放置されたセッションを定期的に掃除する
fn spawn_session_sweeper(state: Arc<AppState>) {
    let period = state.session_service.idle_ttl().min(Duration::from_secs(60));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            state.session_service.purge_idle().await;
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let config = AppConfig::load().context("failed to load configuration")?;
    tracing::info!(?config, "configuration loaded");

    // フォントは起動時に一度だけ読み込む
    let font = load_font(config.font_path.as_deref()).await.context("failed to load caption font")?;
    let catalog = config.load_catalog().await.context("failed to load background catalog")?;

    let storage = LocalFileStorage::new(&config.assets_dir);
    let image_loader = DefaultImageLoader::new(storage, config.fetch_timeout(), config.max_upload_bytes)?;
    let image_processor = Arc::new(DefaultImageProcessor::new(font));

    let state = Arc::new(AppState {
        caption_service: CaptionService::new(image_processor, image_loader, catalog),
        session_service: SessionService::with_limits(config.session_idle_ttl(), config.max_sessions),
    });
    spawn_session_sweeper(state.clone());
    let app = build_router(state, &config.assets_dir, &config.frontend_dir, config.max_upload_bytes);

    tracing::info!(addr = %config.bind_addr, "listening");
    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .await
        .context("server error")?;

    Ok(())
}
