use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    api,
    config::{AppConfig, EngineConfig},
    util::wikipedia::WikipediaClient,
};

#[derive(Clone)]
pub struct AppState {
    pub engine: EngineConfig,
    pub wikipedia: Arc<WikipediaClient>,
    pub search_concurrency: usize,
}

pub fn build_router(config: &AppConfig) -> anyhow::Result<Router> {
    // fail fast on a hash triple the engine would reject per request
    config.engine.hash_params().validate()?;

    let wikipedia = Arc::new(WikipediaClient::new(&config.search)?);
    let state = AppState {
        engine: config.engine.clone(),
        wikipedia,
        search_concurrency: config.search.concurrency,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let router = Router::new()
        .route("/healthz", get(api::health::health_check))
        .route("/search", get(api::search::search_wikipedia))
        .route("/check/text", post(api::check::check_text))
        .route("/check/upload", post(api::check::check_upload))
        .layer(DefaultBodyLimit::max(config.upload.max_bytes))
        .layer(middleware)
        .with_state(state);

    Ok(router)
}
