//! Spot domain model and insert validation.
//!
//! A [`Spot`] is an immutable, named, status-tagged point on the campus map.
//! Its serialized form matches the `spots` collection document shape:
//! `id`, `name`, `status`, `lat`, `lng`, `timestamp`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EpochMillis, SpotId};

/// Maximum accepted length (in characters) of a spot name.
pub const MAX_NAME_LEN: usize = 80;

/// Whether a spot is currently quiet or crowded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    #[default]
    Quiet,
    Crowded,
}

impl SpotStatus {
    /// Wire / storage representation (`"quiet"` or `"crowded"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SpotStatus::Quiet => "quiet",
            SpotStatus::Crowded => "crowded",
        }
    }

    /// Upper-case label shown in marker popups.
    pub fn label(&self) -> &'static str {
        match self {
            SpotStatus::Quiet => "QUIET",
            SpotStatus::Crowded => "CROWDED",
        }
    }
}

impl fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpotStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiet" => Ok(SpotStatus::Quiet),
            "crowded" => Ok(SpotStatus::Crowded),
            other => Err(CoreError::Malformed(format!("unknown spot status '{other}'"))),
        }
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPosition {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A persisted spot as materialized from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    pub id: SpotId,
    pub name: String,
    pub status: SpotStatus,
    pub lat: f64,
    pub lng: f64,
    pub timestamp: EpochMillis,
}

impl Spot {
    pub fn position(&self) -> GeoPosition {
        GeoPosition::new(self.lat, self.lng)
    }
}

/// Insert payload for the `spots` collection: a spot without an identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSpot {
    pub name: String,
    pub status: SpotStatus,
    pub lat: f64,
    pub lng: f64,
    pub timestamp: EpochMillis,
}

impl NewSpot {
    pub fn new(
        name: impl Into<String>,
        status: SpotStatus,
        position: GeoPosition,
        timestamp: EpochMillis,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            lat: position.lat,
            lng: position.lng,
            timestamp,
        }
    }

    /// Attach a store-assigned identifier, producing the persisted form.
    pub fn into_spot(self, id: SpotId) -> Spot {
        Spot {
            id,
            name: self.name,
            status: self.status,
            lat: self.lat,
            lng: self.lng,
            timestamp: self.timestamp,
        }
    }
}

/// Validate a spot name: non-blank and at most [`MAX_NAME_LEN`] characters.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("name must not be empty".into()));
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "name must be at most {MAX_NAME_LEN} characters, got {len}"
        )));
    }
    Ok(())
}

/// Validate that a position is finite and within WGS84 ranges.
pub fn validate_position(position: GeoPosition) -> Result<(), CoreError> {
    if !position.lat.is_finite() || !(-90.0..=90.0).contains(&position.lat) {
        return Err(CoreError::Validation(format!(
            "lat must be between -90 and 90, got {}",
            position.lat
        )));
    }
    if !position.lng.is_finite() || !(-180.0..=180.0).contains(&position.lng) {
        return Err(CoreError::Validation(format!(
            "lng must be between -180 and 180, got {}",
            position.lng
        )));
    }
    Ok(())
}

/// Validate an insert payload before it reaches the store.
pub fn validate_new_spot(spot: &NewSpot) -> Result<(), CoreError> {
    validate_name(&spot.name)?;
    validate_position(GeoPosition::new(spot.lat, spot.lng))?;
    if spot.timestamp < 0 {
        return Err(CoreError::Validation(format!(
            "timestamp must be non-negative, got {}",
            spot.timestamp
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn new_spot(name: &str) -> NewSpot {
        NewSpot::new(name, SpotStatus::Quiet, GeoPosition::new(28.54, 77.17), 1_000)
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&SpotStatus::Crowded).unwrap();
        assert_eq!(json, "\"crowded\"");
        let parsed: SpotStatus = serde_json::from_str("\"quiet\"").unwrap();
        assert_eq!(parsed, SpotStatus::Quiet);
    }

    #[test]
    fn status_defaults_to_quiet() {
        assert_eq!(SpotStatus::default(), SpotStatus::Quiet);
    }

    #[test]
    fn status_from_str_rejects_unknown() {
        assert_matches!("noisy".parse::<SpotStatus>(), Err(CoreError::Malformed(_)));
        assert_eq!("crowded".parse::<SpotStatus>().unwrap(), SpotStatus::Crowded);
    }

    #[test]
    fn status_labels_are_upper_case() {
        assert_eq!(SpotStatus::Quiet.label(), "QUIET");
        assert_eq!(SpotStatus::Crowded.label(), "CROWDED");
    }

    #[test]
    fn spot_document_shape() {
        let spot = new_spot("Library").into_spot("abc".into());
        let json = serde_json::to_value(&spot).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["name"], "Library");
        assert_eq!(json["status"], "quiet");
        assert_eq!(json["lat"], 28.54);
        assert_eq!(json["lng"], 77.17);
        assert_eq!(json["timestamp"], 1_000);
    }

    #[test]
    fn empty_and_blank_names_are_rejected() {
        assert_matches!(validate_name(""), Err(CoreError::Validation(_)));
        assert_matches!(validate_name("   "), Err(CoreError::Validation(_)));
        assert!(validate_name("Reading room").is_ok());
    }

    #[test]
    fn overlong_name_is_rejected() {
        let name = "x".repeat(MAX_NAME_LEN + 1);
        assert_matches!(validate_name(&name), Err(CoreError::Validation(_)));
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        assert!(validate_position(GeoPosition::new(90.0, 180.0)).is_ok());
        assert!(validate_position(GeoPosition::new(90.1, 0.0)).is_err());
        assert!(validate_position(GeoPosition::new(0.0, -180.5)).is_err());
        assert!(validate_position(GeoPosition::new(f64::NAN, 0.0)).is_err());
        assert!(validate_position(GeoPosition::new(0.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn negative_timestamp_is_rejected() {
        let mut spot = new_spot("Canteen");
        spot.timestamp = -1;
        assert_matches!(validate_new_spot(&spot), Err(CoreError::Validation(_)));
    }
}
