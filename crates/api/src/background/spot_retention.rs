//! Optional periodic purge of long-expired spots.
//!
//! Expiry itself is a display filter; this job only bounds the growth of the
//! append-only collection. The effective retention is never shorter than the
//! visibility window, so a visible spot is never purged.

use std::sync::Arc;
use std::time::Duration;

use quietfinder_core::clock::Clock;
use quietfinder_core::expiry::TIME_LIMIT_MS;
use quietfinder_core::types::EpochMillis;
use quietfinder_events::DbSpotStore;
use tokio_util::sync::CancellationToken;

/// How often the purge runs.
pub const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Retention period for a `SPOT_RETENTION_HOURS` setting.
pub fn retention_from_hours(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

/// Oldest timestamp that survives a purge at `now`.
pub fn purge_cutoff(now: EpochMillis, retention: Duration) -> EpochMillis {
    let retention_ms = i64::try_from(retention.as_millis()).unwrap_or(i64::MAX);
    now.saturating_sub(retention_ms.max(TIME_LIMIT_MS))
}

/// Run the purge loop until `cancel` is triggered.
pub async fn run(
    store: Arc<DbSpotStore>,
    clock: Arc<dyn Clock>,
    retention: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        retention_secs = retention.as_secs(),
        interval_secs = PURGE_INTERVAL.as_secs(),
        "Spot retention job started"
    );

    let mut interval = tokio::time::interval(PURGE_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Spot retention job stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = purge_cutoff(clock.now(), retention);
                match store.purge_older_than(cutoff).await {
                    Ok(0) => tracing::debug!("Spot retention: nothing to purge"),
                    Ok(deleted) => tracing::info!(deleted, cutoff, "Spot retention: purged old spots"),
                    Err(e) => tracing::error!(error = %e, "Spot retention: purge failed"),
                }
            }
        }
    }
}
