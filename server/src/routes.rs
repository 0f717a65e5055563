use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::leaderboard;
use crate::state::AppState;
use crate::ws::handler as ws_handler;

/// Build the full axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Browser frontends are served from other origins; the REST surface
    // is open to all of them.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let leaderboard_routes = Router::new()
        .route(
            "/leaderboard",
            axum::routing::get(leaderboard::get_leaderboard),
        )
        .route(
            "/leaderboard",
            axum::routing::post(leaderboard::update_score),
        );

    // WebSocket endpoint for live viewers
    let ws_routes = Router::new().route("/ws", axum::routing::get(ws_handler::ws_upgrade));

    // Health check
    let health = Router::new().route("/health", axum::routing::get(health_check));

    Router::new()
        .merge(leaderboard_routes)
        .merge(ws_routes)
        .merge(health)
        .layer(cors)
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
