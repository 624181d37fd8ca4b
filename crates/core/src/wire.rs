//! Messages exchanged over the live WebSocket feed (`/api/v1/ws`).

use serde::{Deserialize, Serialize};

use crate::spot::Spot;

/// Prefix shared by every versioned API route.
pub const API_PREFIX: &str = "/api/v1";

/// Spot collection, relative to [`API_PREFIX`].
pub const SPOTS_PATH: &str = "/spots";

/// Live feed WebSocket, relative to [`API_PREFIX`].
pub const FEED_PATH: &str = "/ws";

/// Message type tag for full-collection snapshots.
pub const MSG_TYPE_SNAPSHOT: &str = "snapshot";

/// Server-to-client feed message, tagged by `type`.
///
/// ```json
/// {"type": "snapshot", "spots": [{"id": "…", "name": "…", …}]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    Snapshot { spots: Vec<Spot> },
}
