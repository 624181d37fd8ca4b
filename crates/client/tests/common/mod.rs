#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use futures::StreamExt;
use quietfinder_client::view::MapView;
use quietfinder_client::MountedWidget;
use quietfinder_core::error::CoreError;
use quietfinder_core::spot::{NewSpot, Spot, SpotStatus};
use quietfinder_core::store::{SnapshotEvent, SpotStore, SpotSubscription};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::{UnboundedReceiverStream, WatchStream};

pub const T0: i64 = 1_700_000_000_000;

/// Upper bound on how long (in virtual time) a test waits for a view.
const WAIT: Duration = Duration::from_secs(10);

pub fn spot(id: &str, status: SpotStatus, timestamp: i64) -> Spot {
    Spot {
        id: id.into(),
        name: format!("{id} block"),
        status,
        lat: 28.5401,
        lng: 77.1663,
        timestamp,
    }
}

/// In-memory store that publishes the full collection after every write.
pub struct MemoryStore {
    snapshots: watch::Sender<Vec<Spot>>,
    next_id: AtomicUsize,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new(initial: Vec<Spot>) -> Self {
        let (snapshots, _) = watch::channel(initial);
        Self {
            snapshots,
            next_id: AtomicUsize::new(1),
            writes: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.snapshots.receiver_count()
    }
}

#[async_trait::async_trait]
impl SpotStore for MemoryStore {
    async fn add(&self, spot: NewSpot) -> Result<Spot, CoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CoreError::Unavailable("store offline".into()));
        }

        let id = format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let spot = spot.into_spot(id);
        self.snapshots.send_modify(|spots| {
            spots.push(spot.clone());
            spots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        });
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(spot)
    }

    async fn subscribe(&self) -> Result<SpotSubscription, CoreError> {
        let events = WatchStream::new(self.snapshots.subscribe()).map(SnapshotEvent::Snapshot);
        Ok(SpotSubscription::new(events))
    }
}

/// Store whose single subscription replays events pushed by the test.
pub struct ScriptedStore {
    events: Mutex<Option<mpsc::UnboundedReceiver<SnapshotEvent>>>,
}

impl ScriptedStore {
    pub fn new() -> (Self, mpsc::UnboundedSender<SnapshotEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Self {
            events: Mutex::new(Some(rx)),
        };
        (store, tx)
    }
}

#[async_trait::async_trait]
impl SpotStore for ScriptedStore {
    async fn add(&self, spot: NewSpot) -> Result<Spot, CoreError> {
        Ok(spot.into_spot("scripted".into()))
    }

    async fn subscribe(&self) -> Result<SpotSubscription, CoreError> {
        let rx = self
            .events
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| CoreError::Unavailable("already subscribed".into()))?;
        Ok(SpotSubscription::new(UnboundedReceiverStream::new(rx)))
    }
}

/// Wait until the published view satisfies `predicate`.
pub async fn wait_for_view(
    widget: &MountedWidget,
    predicate: impl FnMut(&MapView) -> bool,
) -> MapView {
    let mut views = widget.watch();
    let view = tokio::time::timeout(WAIT, views.wait_for(predicate))
        .await
        .expect("timed out waiting for view")
        .expect("widget stopped publishing");
    view.clone()
}
