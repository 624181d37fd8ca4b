//! End-to-end tests: a real listener, the WebSocket feed, and the client's
//! remote store.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use futures::StreamExt;
use quietfinder_client::config::ClientConfig;
use quietfinder_client::{mount, RemoteStore};
use quietfinder_core::clock::ManualClock;
use quietfinder_core::error::CoreError;
use quietfinder_core::spot::{GeoPosition, NewSpot, SpotStatus};
use quietfinder_core::store::{SnapshotEvent, SpotStore, SpotSubscription};
use tokio::net::TcpListener;

use common::T0;

const WAIT: Duration = Duration::from_secs(5);

/// Serve the test app on an ephemeral port and return a client config for it.
async fn spawn_server() -> (common::TestApp, ClientConfig) {
    let test = common::build_test_app().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = test.app();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (test, ClientConfig::new(format!("http://{addr}")))
}

async fn next_snapshot(subscription: &mut SpotSubscription) -> Vec<quietfinder_core::spot::Spot> {
    loop {
        let event = tokio::time::timeout(WAIT, subscription.next())
            .await
            .expect("timed out waiting for snapshot")
            .expect("subscription ended");
        if let SnapshotEvent::Snapshot(spots) = event {
            return spots;
        }
    }
}

fn library(name: &str) -> NewSpot {
    NewSpot::new(name, SpotStatus::Quiet, GeoPosition::new(28.5412, 77.1671), T0)
}

#[tokio::test]
async fn subscriber_sees_initial_snapshot_then_appends() {
    let (_test, config) = spawn_server().await;
    let store = RemoteStore::new(&config);

    let mut subscription = store.subscribe().await.unwrap();
    assert!(next_snapshot(&mut subscription).await.is_empty());

    let created = store.add(library("Central Library")).await.unwrap();
    assert_eq!(created.name, "Central Library");

    let spots = next_snapshot(&mut subscription).await;
    assert_eq!(spots.len(), 1);
    assert_eq!(spots[0].id, created.id);
}

#[tokio::test]
async fn every_subscriber_receives_the_same_snapshot() {
    let (_test, config) = spawn_server().await;
    let store = RemoteStore::new(&config);

    let mut first = store.subscribe().await.unwrap();
    let mut second = store.subscribe().await.unwrap();
    next_snapshot(&mut first).await;
    next_snapshot(&mut second).await;

    store.add(library("Lawn")).await.unwrap();

    assert_eq!(next_snapshot(&mut first).await, next_snapshot(&mut second).await);
}

#[tokio::test]
async fn remote_validation_errors_map_to_core_errors() {
    let (test, config) = spawn_server().await;
    let store = RemoteStore::new(&config);

    let result = store.add(library("   ")).await;

    assert_matches!(result, Err(CoreError::Validation(_)));
    assert!(test.state.store.snapshot().is_empty());
}

#[tokio::test]
async fn unreachable_server_reports_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = RemoteStore::new(&ClientConfig::new(format!("http://{addr}")));
    assert_matches!(
        store.add(library("Nowhere")).await,
        Err(CoreError::Unavailable(_))
    );

    let mut subscription = store.subscribe().await.unwrap();
    let event = tokio::time::timeout(WAIT, subscription.next())
        .await
        .expect("timed out waiting for disconnect")
        .expect("subscription ended");
    assert_matches!(event, SnapshotEvent::Disconnected(_));
}

#[tokio::test]
async fn mounted_widget_shows_spot_posted_by_another_viewer() {
    let (test, config) = spawn_server().await;
    let clock = Arc::new(ManualClock::new(T0));

    let widget = mount(Arc::new(RemoteStore::new(&config)), clock)
        .await
        .unwrap();

    let mut views = widget.watch();
    tokio::time::timeout(WAIT, views.wait_for(|v| v.banner.is_none()))
        .await
        .unwrap()
        .unwrap();

    let other = RemoteStore::new(&config);
    other.add(library("Reading Room")).await.unwrap();

    let view = tokio::time::timeout(WAIT, views.wait_for(|v| v.markers.len() == 1))
        .await
        .unwrap()
        .unwrap()
        .clone();
    assert_eq!(view.markers[0].popup.name, "Reading Room");
    assert_eq!(view.markers[0].popup.minutes_remaining, 60);

    widget.unmount().await;
    assert_eq!(test.state.store.snapshot().len(), 1);
}
