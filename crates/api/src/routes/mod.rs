pub mod health;

use axum::routing::get;
use axum::Router;
use quietfinder_core::wire::{FEED_PATH, SPOTS_PATH};

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws               WebSocket live feed (snapshot on connect + on change)
/// /spots            GET full collection, POST append
/// /spots/active     GET visible spots with minutes remaining
/// /map              GET campus map configuration
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(FEED_PATH, get(ws::ws_handler))
        .route(
            SPOTS_PATH,
            get(handlers::spots::list_spots).post(handlers::spots::create_spot),
        )
        .route("/spots/active", get(handlers::spots::list_active_spots))
        .route("/map", get(handlers::map::get_map_config))
}
