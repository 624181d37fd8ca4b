//! `quietfinder-client` -- headless spot map viewer.
//!
//! Mounts the spot map against the API server and logs every change to the
//! set of visible spots until interrupted.
//!
//! # Environment variables
//!
//! | Variable              | Required | Default                 | Description                  |
//! |-----------------------|----------|-------------------------|------------------------------|
//! | `QUIETFINDER_API_URL` | no       | `http://localhost:3000` | Base URL of the API server   |
//! | `QUIETFINDER_WS_URL`  | no       | derived from API URL    | Live feed WebSocket endpoint |

use std::sync::Arc;

use quietfinder_client::config::ClientConfig;
use quietfinder_client::view::MapView;
use quietfinder_client::{mount, RemoteStore};
use quietfinder_core::clock::SystemClock;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quietfinder_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(
        api_url = %config.api_url,
        ws_url = %config.ws_url,
        "Starting quietfinder-client",
    );

    let store = Arc::new(RemoteStore::new(&config));
    let widget = match mount(store, Arc::new(SystemClock)).await {
        Ok(widget) => widget,
        Err(e) => {
            tracing::error!(error = %e, "Failed to mount spot map");
            std::process::exit(1);
        }
    };

    let mut views = widget.watch();
    let mut shown = visible_ids(&views.borrow_and_update());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl-C, unmounting");
                break;
            }
            changed = views.changed() => {
                if changed.is_err() {
                    tracing::warn!("Spot map stopped publishing");
                    break;
                }
                let view = views.borrow_and_update().clone();
                log_changes(&mut shown, &view);
            }
        }
    }

    widget.unmount().await;
}

fn visible_ids(view: &MapView) -> Vec<String> {
    view.markers.iter().map(|m| m.id.clone()).collect()
}

fn log_changes(shown: &mut Vec<String>, view: &MapView) {
    if let Some(banner) = &view.banner {
        tracing::info!(?banner, "Banner");
    }

    let ids = visible_ids(view);
    if ids == *shown {
        return;
    }

    for marker in view.markers.iter().filter(|m| !shown.contains(&m.id)) {
        tracing::info!(
            id = %marker.id,
            name = %marker.popup.name,
            status = marker.popup.status_label,
            lat = marker.position.lat,
            lng = marker.position.lng,
            expires_in_mins = marker.popup.minutes_remaining,
            "Spot visible",
        );
    }
    for id in shown.iter().filter(|id| !ids.contains(id)) {
        tracing::info!(%id, "Spot gone");
    }
    tracing::info!(visible = ids.len(), "Visible spots updated");

    *shown = ids;
}
