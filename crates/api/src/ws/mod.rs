//! WebSocket live feed.
//!
//! Provides connection tracking, heartbeat pings, and the HTTP upgrade
//! handler that streams spot snapshots to viewers.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
