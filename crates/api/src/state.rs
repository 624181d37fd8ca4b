use std::sync::Arc;

use quietfinder_core::clock::Clock;
use quietfinder_db::DbPool;
use quietfinder_events::DbSpotStore;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (live map viewers).
    pub ws_manager: Arc<WsManager>,
    /// The spot collection and its snapshot feed.
    pub store: Arc<DbSpotStore>,
    /// Time source for the server-side expiry view.
    pub clock: Arc<dyn Clock>,
}
