//! Quiet Finder live collection.
//!
//! - [`SpotFeed`]: in-process snapshot hub backed by
//!   `tokio::sync::watch`.
//! - [`DbSpotStore`]: the [`SpotStore`](quietfinder_core::store::SpotStore)
//!   that persists appends and republishes the full collection after each
//!   change.

pub mod feed;
pub mod store;

pub use feed::{Snapshot, SpotFeed};
pub use store::DbSpotStore;
