pub mod error;
pub mod handlers;
pub mod proxy;
pub mod state;

use axum::{routing::get, Router};
use state::SharedState;
use tower_http::trace::TraceLayer;

pub fn app(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/api/nuance",
            get(proxy::proxy_get)
                .post(proxy::proxy_post)
                .options(proxy::proxy_options),
        )
        .route("/dashboard", get(handlers::dashboard))
        .route("/miners", get(handlers::miners))
        .route("/miners/:hotkey", get(handlers::miner_profile))
        .route("/stats", get(handlers::stats))
        .layer(TraceLayer::new_for_http())
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any) // In production, specific origin should be used
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}
