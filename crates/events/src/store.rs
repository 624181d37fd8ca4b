//! Database-backed [`SpotStore`]: appends go to SQLite, snapshots go out
//! through a [`SpotFeed`].

use quietfinder_core::error::CoreError;
use quietfinder_core::spot::{validate_new_spot, NewSpot, Spot};
use quietfinder_core::store::{SpotStore, SpotSubscription};
use quietfinder_core::types::EpochMillis;
use quietfinder_db::repositories::SpotRepo;
use quietfinder_db::DbPool;
use tokio::sync::Mutex;

use crate::feed::{Snapshot, SpotFeed};

/// The authoritative spot collection.
pub struct DbSpotStore {
    pool: DbPool,
    feed: SpotFeed,
    /// Serializes reload+publish so snapshots are published in load order.
    refresh_lock: Mutex<()>,
}

impl DbSpotStore {
    /// Open the store and seed the feed with the persisted collection.
    pub async fn open(pool: DbPool) -> Result<Self, sqlx::Error> {
        let spots = SpotRepo::list_newest_first(&pool).await?;
        tracing::info!(count = spots.len(), "Spot store opened");
        Ok(Self {
            pool,
            feed: SpotFeed::new(spots),
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn feed(&self) -> &SpotFeed {
        &self.feed
    }

    /// Latest published snapshot, newest first.
    pub fn snapshot(&self) -> Snapshot {
        self.feed.current()
    }

    /// Reload the collection from the database and publish it.
    pub async fn refresh(&self) -> Result<usize, sqlx::Error> {
        let _guard = self.refresh_lock.lock().await;
        let spots = SpotRepo::list_newest_first(&self.pool).await?;
        let count = spots.len();
        self.feed.publish(spots);
        tracing::debug!(count, subscribers = self.feed.subscriber_count(), "Snapshot published");
        Ok(count)
    }

    /// Delete spots created before `cutoff` and republish if anything changed.
    pub async fn purge_older_than(&self, cutoff: EpochMillis) -> Result<u64, sqlx::Error> {
        let deleted = SpotRepo::delete_older_than(&self.pool, cutoff).await?;
        if deleted > 0 {
            self.refresh().await?;
        }
        Ok(deleted)
    }
}

#[async_trait::async_trait]
impl SpotStore for DbSpotStore {
    async fn add(&self, spot: NewSpot) -> Result<Spot, CoreError> {
        validate_new_spot(&spot)?;

        let stored = SpotRepo::insert(&self.pool, &spot)
            .await
            .map_err(|e| CoreError::Unavailable(format!("failed to store spot: {e}")))?;

        tracing::info!(
            spot_id = %stored.id,
            status = %stored.status,
            timestamp = stored.timestamp,
            "Spot added",
        );

        // The write already succeeded; a failed reload only delays delivery
        // until the next successful refresh.
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Failed to publish snapshot after insert");
        }

        Ok(stored)
    }

    async fn subscribe(&self) -> Result<SpotSubscription, CoreError> {
        Ok(self.feed.subscribe())
    }
}
