use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use quietfinder_core::wire::FeedMessage;
use quietfinder_events::{DbSpotStore, Snapshot};

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// HTTP handler that upgrades the connection to the live spot feed.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager, state.store))
}

/// Encode a snapshot as a `{"type":"snapshot"}` text frame.
fn snapshot_frame(snapshot: &Snapshot) -> Result<Message, serde_json::Error> {
    let msg = FeedMessage::Snapshot {
        spots: snapshot.as_ref().clone(),
    };
    Ok(Message::Text(serde_json::to_string(&msg)?.into()))
}

/// Manage a single viewer connection after upgrade.
///
/// 1. Registers the connection with `WsManager`.
/// 2. Spawns a sender task that writes the current snapshot, then every
///    newer one, interleaved with control frames from the manager.
/// 3. Drains inbound frames on the current task until the peer leaves.
/// 4. Cleans up.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>, store: Arc<DbSpotStore>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut control_rx = ws_manager.add(conn_id.clone()).await;
    let mut snapshots = store.feed().receiver();

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        let initial = snapshots.borrow_and_update().clone();
        match snapshot_frame(&initial) {
            Ok(frame) => {
                if sink.send(frame).await.is_err() {
                    return;
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode snapshot"),
        }

        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        tracing::debug!(conn_id = %sender_conn_id, "Spot feed closed");
                        break;
                    }
                    let snapshot = snapshots.borrow_and_update().clone();
                    let frame = match snapshot_frame(&snapshot) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to encode snapshot");
                            continue;
                        }
                    };
                    if sink.send(frame).await.is_err() {
                        tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                        break;
                    }
                    tracing::trace!(conn_id = %sender_conn_id, count = snapshot.len(), "Snapshot sent");
                }
                control = control_rx.recv() => {
                    let Some(frame) = control else { break };
                    let closing = matches!(frame, Message::Close(_));
                    if sink.send(frame).await.is_err() || closing {
                        break;
                    }
                }
            }
        }
    });

    // Viewers only listen; inbound frames other than Close are ignored.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
