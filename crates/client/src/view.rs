//! Declarative description of what the map should show.
//!
//! A [`MapView`] is rebuilt from [`SpotMap`] on every state change; a
//! renderer draws it as-is and never filters or formats on its own.

use quietfinder_core::campus::{IconStyle, MapConfig, MarkerIcon, CAMPUS_NAME};
use quietfinder_core::expiry::{minutes_remaining, TIME_LIMIT_MS};
use quietfinder_core::spot::{GeoPosition, SpotStatus};
use serde::Serialize;

use crate::widget::{Banner, SpotMap};

pub const LEGEND_SUBTITLE: &str = "Crowdsourced Study Spots";
pub const FORM_TITLE: &str = "Add New Spot";
pub const NAME_PLACEHOLDER: &str = "Location Name...";
pub const POST_LABEL: &str = "Post";
pub const CANCEL_LABEL: &str = "Cancel";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub map: MapConfig,
    pub legend: Legend,
    pub markers: Vec<SpotMarker>,
    pub pending: Option<PendingMarker>,
    pub banner: Option<Banner>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub entries: Vec<LegendEntry>,
    pub footnote: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub icon: MarkerIcon,
    pub label: &'static str,
}

/// One persisted, still-visible spot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpotMarker {
    pub id: String,
    pub position: GeoPosition,
    pub icon: IconStyle,
    pub popup: SpotPopup,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpotPopup {
    pub name: String,
    pub status_label: &'static str,
    pub minutes_remaining: i64,
}

impl SpotPopup {
    /// Footer line, e.g. `Expires in: 42 min`.
    pub fn expiry_line(&self) -> String {
        format!("Expires in: {} min", self.minutes_remaining)
    }
}

/// The unsaved pin with its entry form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingMarker {
    pub position: GeoPosition,
    pub icon: IconStyle,
    pub form: FormView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub title: &'static str,
    pub name_placeholder: &'static str,
    pub name: String,
    pub status: SpotStatus,
    pub status_options: Vec<StatusOption>,
    pub submit_label: &'static str,
    pub cancel_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusOption {
    pub value: SpotStatus,
    pub label: &'static str,
}

fn legend() -> Legend {
    Legend {
        title: CAMPUS_NAME,
        subtitle: LEGEND_SUBTITLE,
        entries: vec![
            LegendEntry {
                icon: MarkerIcon::Green,
                label: "Quiet / Empty",
            },
            LegendEntry {
                icon: MarkerIcon::Red,
                label: "Crowded / Noisy",
            },
        ],
        footnote: format!("*Pins vanish in {} minutes", TIME_LIMIT_MS / 60_000),
    }
}

fn status_options() -> Vec<StatusOption> {
    vec![
        StatusOption {
            value: SpotStatus::Quiet,
            label: "🟢 Quiet / Empty",
        },
        StatusOption {
            value: SpotStatus::Crowded,
            label: "🔴 Crowded / Noisy",
        },
    ]
}

pub fn render(map: &SpotMap) -> MapView {
    let now = map.now();

    let markers = map
        .visible_spots()
        .into_iter()
        .map(|spot| SpotMarker {
            position: spot.position(),
            icon: MarkerIcon::for_status(spot.status).style(),
            popup: SpotPopup {
                status_label: spot.status.label(),
                minutes_remaining: minutes_remaining(&spot, now),
                name: spot.name,
            },
            id: spot.id,
        })
        .collect();

    let pending = map.pending().map(|pending| PendingMarker {
        position: pending.position,
        icon: MarkerIcon::pending().style(),
        form: FormView {
            title: FORM_TITLE,
            name_placeholder: NAME_PLACEHOLDER,
            name: map.form().name.clone(),
            status: map.form().status,
            status_options: status_options(),
            submit_label: POST_LABEL,
            cancel_label: CANCEL_LABEL,
        },
    });

    MapView {
        map: MapConfig::campus(),
        legend: legend(),
        markers,
        pending,
        banner: map.banner().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use quietfinder_core::spot::Spot;
    use quietfinder_core::store::SnapshotEvent;

    use super::*;

    const T0: i64 = 1_700_000_000_000;

    fn spot(id: &str, status: SpotStatus, timestamp: i64) -> Spot {
        Spot {
            id: id.into(),
            name: format!("{id} hall"),
            status,
            lat: 28.54,
            lng: 77.16,
            timestamp,
        }
    }

    #[test]
    fn markers_follow_status_and_expiry() {
        let mut map = SpotMap::new(T0);
        map.apply(SnapshotEvent::Snapshot(vec![
            spot("new", SpotStatus::Crowded, T0),
            spot("old", SpotStatus::Quiet, T0 - TIME_LIMIT_MS),
        ]));

        let view = map.view();

        assert_eq!(view.markers.len(), 1);
        let marker = &view.markers[0];
        assert_eq!(marker.id, "new");
        assert_eq!(marker.icon.icon, MarkerIcon::Red);
        assert_eq!(marker.popup.name, "new hall");
        assert_eq!(marker.popup.status_label, "CROWDED");
        assert_eq!(marker.popup.expiry_line(), "Expires in: 60 min");
    }

    #[test]
    fn pending_marker_is_blue_with_form() {
        let mut map = SpotMap::new(T0);
        map.click(GeoPosition::new(28.541, 77.167));
        map.set_name("Lawn");

        let view = map.view();
        let pending = view.pending.expect("pending marker");

        assert_eq!(pending.icon.icon, MarkerIcon::Blue);
        assert_eq!(pending.form.name, "Lawn");
        assert_eq!(pending.form.status, SpotStatus::Quiet);
        let labels: Vec<_> = pending.form.status_options.iter().map(|o| o.label).collect();
        assert_eq!(labels, ["🟢 Quiet / Empty", "🔴 Crowded / Noisy"]);
        assert_eq!(pending.form.submit_label, "Post");
    }

    #[test]
    fn no_pending_marker_without_click() {
        let view = SpotMap::new(T0).view();
        assert!(view.pending.is_none());
        assert_eq!(view.banner, Some(Banner::Connecting));
    }

    #[test]
    fn legend_footnote_tracks_time_limit() {
        let view = SpotMap::new(T0).view();
        assert_eq!(view.legend.footnote, "*Pins vanish in 60 minutes");
        assert_eq!(view.legend.subtitle, LEGEND_SUBTITLE);
        assert_eq!(view.legend.entries.len(), 2);
    }
}
