//! In-process snapshot feed backed by a `tokio::sync::watch` channel.
//!
//! [`SpotFeed`] holds the latest full collection of spots and hands out
//! subscriptions that see the current snapshot first, then every newer one.
//! Intermediate snapshots may be coalesced for slow subscribers; since each
//! snapshot is the complete collection, only the latest matters.

use std::sync::Arc;

use futures::StreamExt;
use quietfinder_core::spot::Spot;
use quietfinder_core::store::{SnapshotEvent, SpotSubscription};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Shared, immutable snapshot of the collection, newest first.
pub type Snapshot = Arc<Vec<Spot>>;

/// Fan-out hub for full-collection snapshots.
///
/// Designed to be shared via `Arc` (or owned by a store that is).
pub struct SpotFeed {
    sender: watch::Sender<Snapshot>,
}

impl SpotFeed {
    /// Create a feed seeded with an initial snapshot.
    pub fn new(initial: Vec<Spot>) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self { sender }
    }

    /// Replace the current snapshot and wake every subscriber.
    ///
    /// Succeeds even when nobody is subscribed.
    pub fn publish(&self, spots: Vec<Spot>) {
        self.sender.send_replace(Arc::new(spots));
    }

    /// The most recently published snapshot.
    pub fn current(&self) -> Snapshot {
        self.sender.borrow().clone()
    }

    /// Raw watch receiver, for callers that `select!` on changes directly.
    pub fn receiver(&self) -> watch::Receiver<Snapshot> {
        self.sender.subscribe()
    }

    /// Number of live receivers (subscriptions and raw receivers).
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Subscribe as a [`SpotSubscription`] stream.
    pub fn subscribe(&self) -> SpotSubscription {
        let events = WatchStream::new(self.sender.subscribe())
            .map(|spots| SnapshotEvent::Snapshot(spots.as_ref().clone()));
        SpotSubscription::new(events)
    }
}

impl Default for SpotFeed {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
