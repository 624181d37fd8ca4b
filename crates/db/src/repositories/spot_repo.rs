//! Repository for the `spots` table (append-only).

use quietfinder_core::spot::{NewSpot, Spot};
use quietfinder_core::types::EpochMillis;

use crate::models::spot::SpotRow;
use crate::DbPool;

/// Column list for `spots` SELECT queries.
const COLUMNS: &str = "id, name, status, lat, lng, timestamp";

/// Provides query operations for spots.
pub struct SpotRepo;

impl SpotRepo {
    /// Append a spot, assigning a fresh opaque identifier.
    pub async fn insert(pool: &DbPool, spot: &NewSpot) -> Result<Spot, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let query = format!(
            "INSERT INTO spots ({COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SpotRow>(&query)
            .bind(&id)
            .bind(&spot.name)
            .bind(spot.status.as_str())
            .bind(spot.lat)
            .bind(spot.lng)
            .bind(spot.timestamp)
            .fetch_one(pool)
            .await?;

        Spot::try_from(row).map_err(|e| sqlx::Error::Decode(Box::new(e)))
    }

    /// Materialize the whole collection, newest first.
    ///
    /// Ties on `timestamp` are broken by insertion order (latest first).
    /// Rows that cannot be decoded are skipped and logged.
    pub async fn list_newest_first(pool: &DbPool) -> Result<Vec<Spot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM spots ORDER BY timestamp DESC, seq DESC");
        let rows = sqlx::query_as::<_, SpotRow>(&query)
            .fetch_all(pool)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match Spot::try_from(row) {
                Ok(spot) => Some(spot),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed spot row");
                    None
                }
            })
            .collect())
    }

    /// Total number of stored rows, including expired and malformed ones.
    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM spots")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Delete spots created strictly before `cutoff`. Returns rows removed.
    pub async fn delete_older_than(pool: &DbPool, cutoff: EpochMillis) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM spots WHERE timestamp < ?")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
