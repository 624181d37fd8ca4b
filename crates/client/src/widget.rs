//! The spot map widget as a render-agnostic state machine.
//!
//! [`SpotMap`] owns three independent slices of state: the latest snapshot
//! from the store, the local interaction state (pending pin and form), and
//! the current time used by the expiry filter. Every method is synchronous;
//! the [`runtime`](crate::runtime) module drives it from a single event loop.

use quietfinder_core::campus::CAMPUS_BOUNDS;
use quietfinder_core::expiry::visible_spots;
use quietfinder_core::spot::{GeoPosition, NewSpot, Spot, SpotStatus};
use quietfinder_core::store::SnapshotEvent;
use quietfinder_core::types::EpochMillis;
use serde::Serialize;

use crate::view::{self, MapView};

/// Alert text shown when the form is submitted without a name.
pub const EMPTY_NAME_ALERT: &str = "Enter a name!";

/// Reasons a submission is refused before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// The name field is empty; shown to the user as a blocking alert.
    #[error("Enter a name!")]
    EmptyName,

    #[error("No pending position to submit")]
    NoPendingPosition,

    #[error("Widget is not mounted")]
    Unmounted,
}

/// The single unsaved pin a user is placing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendingSpot {
    pub position: GeoPosition,
}

/// Form fields for the pending pin.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SpotForm {
    pub name: String,
    pub status: SpotStatus,
}

/// Status line shown above the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Banner {
    /// Waiting for the first snapshot.
    Connecting,
    /// The live feed dropped; the last known spots are still shown.
    Reconnecting(String),
    /// The last submission failed to reach the store.
    WriteFailed(String),
}

#[derive(Debug, Clone)]
pub struct SpotMap {
    spots: Vec<Spot>,
    pending: Option<PendingSpot>,
    form: SpotForm,
    now: EpochMillis,
    banner: Option<Banner>,
}

impl SpotMap {
    pub fn new(now: EpochMillis) -> Self {
        Self {
            spots: Vec::new(),
            pending: None,
            form: SpotForm::default(),
            now,
            banner: Some(Banner::Connecting),
        }
    }

    /// Apply one subscription event.
    ///
    /// A snapshot replaces the whole working set. A disconnect keeps the last
    /// known spots on screen and raises the reconnect banner.
    pub fn apply(&mut self, event: SnapshotEvent) {
        match event {
            SnapshotEvent::Snapshot(spots) => {
                self.spots = spots;
                if matches!(
                    self.banner,
                    Some(Banner::Connecting | Banner::Reconnecting(_))
                ) {
                    self.banner = None;
                }
            }
            SnapshotEvent::Disconnected(reason) => {
                if !matches!(self.banner, Some(Banner::WriteFailed(_))) {
                    self.banner = Some(Banner::Reconnecting(reason));
                }
            }
        }
    }

    /// Advance the clock used by the expiry filter.
    pub fn tick(&mut self, now: EpochMillis) {
        self.now = now;
    }

    /// A map click: place (or move) the pending pin.
    ///
    /// Clicks outside the campus bounds are ignored and leave any existing
    /// pending pin where it is.
    pub fn click(&mut self, position: GeoPosition) {
        if !CAMPUS_BOUNDS.contains(position) {
            tracing::debug!(
                lat = position.lat,
                lng = position.lng,
                "Ignoring click outside campus"
            );
            return;
        }
        self.pending = Some(PendingSpot { position });
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    pub fn set_status(&mut self, status: SpotStatus) {
        self.form.status = status;
    }

    /// Validate the form and turn the pending pin into a spot to append.
    ///
    /// On success the pending pin and the name are cleared; the status choice
    /// is kept for the next pin. On failure nothing changes.
    pub fn submit(&mut self, now: EpochMillis) -> Result<NewSpot, FormError> {
        let pending = self.pending.ok_or(FormError::NoPendingPosition)?;
        if self.form.name.trim().is_empty() {
            return Err(FormError::EmptyName);
        }

        let spot = NewSpot::new(
            std::mem::take(&mut self.form.name),
            self.form.status,
            pending.position,
            now,
        );
        self.pending = None;
        Ok(spot)
    }

    /// Discard the pending pin without writing anything.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn write_failed(&mut self, reason: impl Into<String>) {
        self.banner = Some(Banner::WriteFailed(reason.into()));
    }

    pub fn dismiss_banner(&mut self) {
        if matches!(self.banner, Some(Banner::WriteFailed(_))) {
            self.banner = None;
        }
    }

    /// Complete working set, newest first, including expired spots.
    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn pending(&self) -> Option<PendingSpot> {
        self.pending
    }

    pub fn form(&self) -> &SpotForm {
        &self.form
    }

    pub fn now(&self) -> EpochMillis {
        self.now
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Spots still inside the expiry window at the widget's current time.
    pub fn visible_spots(&self) -> Vec<Spot> {
        visible_spots(&self.spots, self.now)
    }

    pub fn view(&self) -> MapView {
        view::render(self)
    }
}
