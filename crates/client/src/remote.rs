//! [`SpotStore`] backed by the API server.
//!
//! Writes go through `POST /api/v1/spots`. Subscriptions hold a WebSocket to
//! `/api/v1/ws` open in a background task and reconnect with backoff when it
//! drops; every drop is surfaced to the subscriber as
//! [`SnapshotEvent::Disconnected`].

use futures::{SinkExt, StreamExt};
use quietfinder_core::error::CoreError;
use quietfinder_core::spot::{validate_position, NewSpot, Spot};
use quietfinder_core::store::{SnapshotEvent, SpotStore, SpotSubscription};
use quietfinder_core::wire::{API_PREFIX, MSG_TYPE_SNAPSHOT, SPOTS_PATH};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::reconnect::{self, FeedStream, ReconnectConfig};

/// Buffered snapshots per subscription before the feed task waits.
const EVENT_BUFFER: usize = 16;

#[derive(Debug, Clone)]
pub struct RemoteStore {
    http: reqwest::Client,
    api_url: String,
    ws_url: String,
    reconnect: ReconnectConfig,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: String,
}

/// Loosely typed feed frame so one bad spot does not discard the snapshot.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    spots: Vec<serde_json::Value>,
}

/// Why a feed session ended.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Cancelled,
    Lost(String),
}

impl RemoteStore {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            ws_url: config.ws_url.clone(),
            reconnect: ReconnectConfig::default(),
        }
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    fn spots_url(&self) -> String {
        format!("{}{API_PREFIX}{SPOTS_PATH}", self.api_url)
    }
}

#[async_trait::async_trait]
impl SpotStore for RemoteStore {
    async fn add(&self, spot: NewSpot) -> Result<Spot, CoreError> {
        let response = self
            .http
            .post(self.spots_url())
            .json(&spot)
            .send()
            .await
            .map_err(|e| CoreError::Unavailable(format!("Failed to reach spot store: {e}")))?;

        let status = response.status();
        if status.is_success() {
            let body: DataEnvelope<Spot> = response
                .json()
                .await
                .map_err(|e| CoreError::Malformed(format!("Invalid spot response: {e}")))?;
            return Ok(body.data);
        }

        let body = response.json::<ErrorBody>().await.ok();
        let message = body
            .as_ref()
            .map(|b| b.error.clone())
            .unwrap_or_else(|| status.to_string());
        tracing::debug!(
            status = status.as_u16(),
            code = body.as_ref().map(|b| b.code.as_str()).unwrap_or_default(),
            "Spot store rejected write",
        );

        Err(match status.as_u16() {
            400 | 422 => CoreError::Validation(message),
            503 => CoreError::Unavailable(message),
            _ => CoreError::Internal(format!("Spot store returned {status}: {message}")),
        })
    }

    async fn subscribe(&self) -> Result<SpotSubscription, CoreError> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let cancel = CancellationToken::new();

        tokio::spawn(run_feed(
            self.ws_url.clone(),
            self.reconnect.clone(),
            tx,
            cancel.clone(),
        ));

        // The guard travels with the stream: dropping the subscription
        // cancels the feed task.
        let guard = cancel.drop_guard();
        let events = futures::stream::unfold((rx, guard), |(mut rx, guard)| async move {
            rx.recv().await.map(|event| (event, (rx, guard)))
        });

        Ok(SpotSubscription::new(events))
    }
}

/// Connect, stream snapshots, and reconnect until cancelled.
async fn run_feed(
    ws_url: String,
    reconnect: ReconnectConfig,
    events: mpsc::Sender<SnapshotEvent>,
    cancel: CancellationToken,
) {
    tracing::info!(url = %ws_url, "Connecting to spot feed");

    let mut connection = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        result = reconnect::connect(&ws_url) => result,
    };

    loop {
        let ws_stream = match connection {
            Ok(ws_stream) => ws_stream,
            Err(reason) => {
                tracing::warn!(error = %reason, "Spot feed unavailable");
                if events.send(SnapshotEvent::Disconnected(reason)).await.is_err() {
                    return;
                }
                match reconnect::reconnect_loop(&ws_url, &reconnect, &cancel).await {
                    Some(ws_stream) => ws_stream,
                    None => return,
                }
            }
        };

        match run_session(ws_stream, &events, &cancel).await {
            SessionEnd::Cancelled => {
                tracing::debug!("Spot feed closed");
                return;
            }
            SessionEnd::Lost(reason) => connection = Err(reason),
        }
    }
}

/// Forward snapshot frames from one connection until it drops.
async fn run_session(
    ws_stream: FeedStream,
    events: &mpsc::Sender<SnapshotEvent>,
    cancel: &CancellationToken,
) -> SessionEnd {
    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                return SessionEnd::Cancelled;
            }
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Some(spots) = decode_frame(&text) {
                        if events.send(SnapshotEvent::Snapshot(spots)).await.is_err() {
                            return SessionEnd::Cancelled;
                        }
                    }
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                    // Handled automatically by tungstenite.
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "Server closed spot feed");
                    return SessionEnd::Lost("Server closed the spot feed".into());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Spot feed receive error");
                    return SessionEnd::Lost(e.to_string());
                }
                None => return SessionEnd::Lost("Spot feed ended".into()),
            }
        }
    }
}

/// Decode a snapshot frame, skipping spots that fail to parse or carry an
/// impossible position.
///
/// Returns `None` for frames that are not snapshots or are not JSON.
fn decode_frame(text: &str) -> Option<Vec<Spot>> {
    let frame: RawFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unparseable feed frame");
            return None;
        }
    };

    if frame.kind != MSG_TYPE_SNAPSHOT {
        tracing::debug!(kind = %frame.kind, "Ignoring feed frame");
        return None;
    }

    let spots = frame
        .spots
        .into_iter()
        .filter_map(|value| match decode_spot(value) {
            Ok(spot) => Some(spot),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed spot in snapshot");
                None
            }
        })
        .collect();
    Some(spots)
}

fn decode_spot(value: serde_json::Value) -> Result<Spot, CoreError> {
    let spot: Spot =
        serde_json::from_value(value).map_err(|e| CoreError::Malformed(e.to_string()))?;
    validate_position(spot.position())
        .map_err(|e| CoreError::Malformed(format!("spot {}: {e}", spot.id)))?;
    Ok(spot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quietfinder_core::spot::SpotStatus;

    #[test]
    fn decodes_snapshot_frame() {
        let text = r#"{"type":"snapshot","spots":[
            {"id":"a","name":"Library","status":"quiet","lat":28.54,"lng":77.16,"timestamp":5}
        ]}"#;
        let spots = decode_frame(text).unwrap();
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].status, SpotStatus::Quiet);
        assert_eq!(spots[0].timestamp, 5);
    }

    #[test]
    fn skips_malformed_spots_but_keeps_the_rest() {
        let text = r#"{"type":"snapshot","spots":[
            {"id":"a","name":"Canteen","status":"packed","lat":1.0,"lng":2.0,"timestamp":1},
            {"id":"b","name":"Lawn"},
            {"id":"c","name":"Lab","status":"crowded","lat":1.0,"lng":2.0,"timestamp":3}
        ]}"#;
        let spots = decode_frame(text).unwrap();
        let ids: Vec<_> = spots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["c"]);
    }

    #[test]
    fn skips_spots_with_impossible_positions() {
        let text = r#"{"type":"snapshot","spots":[
            {"id":"a","name":"Nowhere","status":"quiet","lat":123.0,"lng":77.16,"timestamp":1},
            {"id":"b","name":"Lab","status":"quiet","lat":28.54,"lng":-181.0,"timestamp":2},
            {"id":"c","name":"Lawn","status":"quiet","lat":28.54,"lng":77.16,"timestamp":3}
        ]}"#;
        let spots = decode_frame(text).unwrap();
        let ids: Vec<_> = spots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["c"]);
    }

    #[test]
    fn ignores_other_frame_types_and_garbage() {
        assert!(decode_frame(r#"{"type":"ping"}"#).is_none());
        assert!(decode_frame("not json").is_none());
    }

    #[test]
    fn empty_snapshot_is_still_a_snapshot() {
        assert_eq!(decode_frame(r#"{"type":"snapshot","spots":[]}"#), Some(vec![]));
    }

    #[test]
    fn ws_url_comes_from_config() {
        let store = RemoteStore::new(&ClientConfig::new("https://spots.example.org/"));
        assert_eq!(store.spots_url(), "https://spots.example.org/api/v1/spots");
        assert_eq!(store.ws_url, "wss://spots.example.org/api/v1/ws");
    }
}
