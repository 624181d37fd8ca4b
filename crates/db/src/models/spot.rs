//! Row model for the `spots` table.

use quietfinder_core::error::CoreError;
use quietfinder_core::spot::{validate_position, GeoPosition, Spot};
use quietfinder_core::types::{EpochMillis, SpotId};
use sqlx::FromRow;

/// A raw row from the `spots` table, before status decoding.
#[derive(Debug, Clone, FromRow)]
pub struct SpotRow {
    pub id: SpotId,
    pub name: String,
    pub status: String,
    pub lat: f64,
    pub lng: f64,
    pub timestamp: EpochMillis,
}

impl TryFrom<SpotRow> for Spot {
    type Error = CoreError;

    fn try_from(row: SpotRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|e: CoreError| {
            CoreError::Malformed(format!("spot {}: {e}", row.id))
        })?;
        validate_position(GeoPosition::new(row.lat, row.lng))
            .map_err(|e| CoreError::Malformed(format!("spot {}: {e}", row.id)))?;

        Ok(Spot {
            id: row.id,
            name: row.name,
            status,
            lat: row.lat,
            lng: row.lng,
            timestamp: row.timestamp,
        })
    }
}
