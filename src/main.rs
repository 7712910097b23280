mod api;
mod artifact_store;
mod config;
mod error;
mod footage;
mod models;
mod pipeline;
mod registry;
mod scene;
mod speech;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::Result;
use artifact_store::AssetStore;
use axum::{
    routing::{get, post},
    Router,
};
use config::Config;
use footage::PexelsFootage;
use registry::JobRegistry;
use scene::SceneProcessor;
use speech::StreamElementsSpeech;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: JobRegistry,
    pub processor: Arc<SceneProcessor>,
}

pub fn build_router(state: AppState) -> Router {
    let videos = ServeDir::new(&state.config.video_dir);

    Router::new()
        .route("/", get(api::health))
        .route("/api/music-tags", get(api::music_tags))
        .route("/api/short-video", post(api::create_video))
        .route("/api/short-video/{video_id}", get(api::download_video))
        .route(
            "/api/short-video/{video_id}/status",
            get(api::get_video_status),
        )
        .nest_service("/videos", videos)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "short_video_api=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let store = AssetStore::new(&config.audio_dir, &config.video_dir);
    store.ensure_dirs().await?;

    if !config.footage_credential_configured() {
        warn!("PEXELS_API_KEY missing; every job will fail at footage search");
    }

    let processor = SceneProcessor::new(
        Arc::new(StreamElementsSpeech::from_config(&config)?),
        Arc::new(PexelsFootage::from_config(&config)?),
        store,
    );
    let state = AppState {
        config: config.clone(),
        registry: JobRegistry::new(),
        processor: Arc::new(processor),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("short-video-api listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
