#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use quietfinder_core::clock::{Clock, ManualClock};
use quietfinder_db::DbPool;
use quietfinder_events::DbSpotStore;
use tower::ServiceExt;

use quietfinder_api::config::ServerConfig;
use quietfinder_api::router::build_app_router;
use quietfinder_api::state::AppState;
use quietfinder_api::ws::WsManager;

pub const T0: i64 = 1_700_000_000_000;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        spot_retention_hours: None,
    }
}

/// A migrated in-memory database.
pub async fn test_pool() -> DbPool {
    let pool = quietfinder_db::create_memory_pool()
        .await
        .expect("open in-memory database");
    quietfinder_db::run_migrations(&pool)
        .await
        .expect("run migrations");
    pool
}

/// Everything a test needs to drive the app and inspect its state.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: ManualClock,
}

impl TestApp {
    /// A fresh router sharing this app's state.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with all middleware layers on a fresh
/// in-memory database, with a manual clock starting at [`T0`].
pub async fn build_test_app() -> TestApp {
    let config = test_config();
    let pool = test_pool().await;
    let store = Arc::new(DbSpotStore::open(pool.clone()).await.expect("open store"));
    let clock = ManualClock::new(T0);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::new(WsManager::new()),
        store,
        clock: Arc::new(clock.clone()) as Arc<dyn Clock>,
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        clock,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<String>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
