//! The spot store seam: append-only writes plus a live snapshot feed.
//!
//! Implementations are constructed once at startup and injected as
//! `Arc<dyn SpotStore>` into whatever needs them.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};

use crate::error::CoreError;
use crate::spot::{NewSpot, Spot};

/// One item of a live subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotEvent {
    /// The complete collection, newest first. Replaces any previous view.
    Snapshot(Vec<Spot>),
    /// The live feed was lost; the subscription is trying to re-establish it.
    Disconnected(String),
}

/// A cancellable, non-restartable stream of [`SnapshotEvent`]s.
///
/// The first event delivered is the current snapshot. The stream never ends
/// on its own while the store is alive; dropping it (or calling
/// [`unsubscribe`](Self::unsubscribe)) releases the underlying feed.
pub struct SpotSubscription {
    events: BoxStream<'static, SnapshotEvent>,
}

impl SpotSubscription {
    pub fn new<S>(events: S) -> Self
    where
        S: Stream<Item = SnapshotEvent> + Send + 'static,
    {
        Self {
            events: events.boxed(),
        }
    }

    /// Cancel the subscription.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Stream for SpotSubscription {
    type Item = SnapshotEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for SpotSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotSubscription").finish_non_exhaustive()
    }
}

/// Append-only spot collection with live, ordered subscriptions.
#[async_trait::async_trait]
pub trait SpotStore: Send + Sync {
    /// Append a spot. The store assigns the identifier.
    async fn add(&self, spot: NewSpot) -> Result<Spot, CoreError>;

    /// Subscribe to full-collection snapshots ordered by descending timestamp.
    async fn subscribe(&self) -> Result<SpotSubscription, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spot::SpotStatus;

    fn spot(id: &str) -> Spot {
        Spot {
            id: id.into(),
            name: id.into(),
            status: SpotStatus::Crowded,
            lat: 0.0,
            lng: 0.0,
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn subscription_yields_wrapped_events_in_order() {
        let events = vec![
            SnapshotEvent::Snapshot(vec![]),
            SnapshotEvent::Disconnected("gone".into()),
            SnapshotEvent::Snapshot(vec![spot("a")]),
        ];
        let mut sub = SpotSubscription::new(futures::stream::iter(events.clone()));

        let mut received = Vec::new();
        while let Some(event) = sub.next().await {
            received.push(event);
        }
        assert_eq!(received, events);
    }
}
