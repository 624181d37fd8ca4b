//! Fixed campus map configuration.
//!
//! The map is centred on one campus and clamped to a bounding box and zoom
//! range. Tiles come from the public OpenStreetMap endpoint; markers use the
//! leaflet-color-markers icon set.

use serde::Serialize;

use crate::expiry::TIME_LIMIT_MS;
use crate::spot::{GeoPosition, SpotStatus};

pub const CAMPUS_NAME: &str = "JNU Quiet Finder";

pub const CAMPUS_CENTER: GeoPosition = GeoPosition {
    lat: 28.5398,
    lng: 77.1666,
};

pub const CAMPUS_BOUNDS: GeoBounds = GeoBounds {
    south_west: GeoPosition {
        lat: 28.5250,
        lng: 77.1450,
    },
    north_east: GeoPosition {
        lat: 28.5600,
        lng: 77.1850,
    },
};

pub const DEFAULT_ZOOM: u8 = 16;
pub const MIN_ZOOM: u8 = 15;

pub const TILE_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";

const ICON_BASE_URL: &str =
    "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img";
const SHADOW_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet/0.7.7/images/marker-shadow.png";

/// Axis-aligned lat/lng rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoBounds {
    pub south_west: GeoPosition,
    pub north_east: GeoPosition,
}

impl GeoBounds {
    /// Whether `position` lies inside the rectangle (edges inclusive).
    pub fn contains(&self, position: GeoPosition) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&position.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&position.lng)
    }
}

/// Marker colours available on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerIcon {
    Green,
    Red,
    Blue,
}

impl MarkerIcon {
    /// Icon used for a persisted spot of the given status.
    pub fn for_status(status: SpotStatus) -> Self {
        match status {
            SpotStatus::Quiet => MarkerIcon::Green,
            SpotStatus::Crowded => MarkerIcon::Red,
        }
    }

    /// Icon used for the unsaved pending pin.
    pub fn pending() -> Self {
        MarkerIcon::Blue
    }

    pub fn url(&self) -> String {
        let colour = match self {
            MarkerIcon::Green => "green",
            MarkerIcon::Red => "red",
            MarkerIcon::Blue => "blue",
        };
        format!("{ICON_BASE_URL}/marker-icon-2x-{colour}.png")
    }

    pub fn style(&self) -> IconStyle {
        IconStyle {
            icon: *self,
            icon_url: self.url(),
            icon_size: [25, 41],
            icon_anchor: [12, 41],
            popup_anchor: [1, -34],
            shadow_url: SHADOW_URL,
            shadow_size: [41, 41],
        }
    }
}

/// Full sprite description for a marker icon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IconStyle {
    pub icon: MarkerIcon,
    pub icon_url: String,
    pub icon_size: [u16; 2],
    pub icon_anchor: [i16; 2],
    pub popup_anchor: [i16; 2],
    pub shadow_url: &'static str,
    pub shadow_size: [u16; 2],
}

/// Everything a renderer needs to set up the campus map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapConfig {
    pub title: &'static str,
    pub center: GeoPosition,
    pub bounds: GeoBounds,
    pub zoom: u8,
    pub min_zoom: u8,
    pub tile_url: &'static str,
    pub attribution: &'static str,
    pub icons: Vec<IconStyle>,
    pub time_limit_ms: i64,
}

impl MapConfig {
    pub fn campus() -> Self {
        Self {
            title: CAMPUS_NAME,
            center: CAMPUS_CENTER,
            bounds: CAMPUS_BOUNDS,
            zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            tile_url: TILE_URL_TEMPLATE,
            attribution: TILE_ATTRIBUTION,
            icons: [MarkerIcon::Green, MarkerIcon::Red, MarkerIcon::Blue]
                .iter()
                .map(MarkerIcon::style)
                .collect(),
            time_limit_ms: TIME_LIMIT_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_lies_inside_bounds() {
        assert!(CAMPUS_BOUNDS.contains(CAMPUS_CENTER));
    }

    #[test]
    fn bounds_include_edges_and_reject_outside_points() {
        assert!(CAMPUS_BOUNDS.contains(CAMPUS_BOUNDS.south_west));
        assert!(CAMPUS_BOUNDS.contains(CAMPUS_BOUNDS.north_east));
        assert!(!CAMPUS_BOUNDS.contains(GeoPosition::new(29.0, 77.1666)));
        assert!(!CAMPUS_BOUNDS.contains(GeoPosition::new(28.5398, 77.2000)));
    }

    #[test]
    fn status_icons_are_colour_coded() {
        assert_eq!(MarkerIcon::for_status(SpotStatus::Quiet), MarkerIcon::Green);
        assert_eq!(MarkerIcon::for_status(SpotStatus::Crowded), MarkerIcon::Red);
        assert_eq!(MarkerIcon::pending(), MarkerIcon::Blue);
    }

    #[test]
    fn icon_urls_point_at_colour_sprites() {
        assert!(MarkerIcon::Red.url().ends_with("marker-icon-2x-red.png"));
        assert!(MarkerIcon::Blue.url().starts_with("https://"));
    }

    #[test]
    fn campus_config_has_three_icons() {
        let config = MapConfig::campus();
        assert_eq!(config.icons.len(), 3);
        assert_eq!(config.min_zoom, 15);
        assert_eq!(config.time_limit_ms, TIME_LIMIT_MS);
    }
}
