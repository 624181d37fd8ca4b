//! Client-side expiry window for spots.
//!
//! Expiry is a display filter only: nothing is removed from the store.
//! A spot is visible while `now - timestamp < TIME_LIMIT_MS`; at exactly the
//! limit it is hidden.

use crate::spot::Spot;
use crate::types::EpochMillis;

/// How long a spot stays visible after creation (one hour).
pub const TIME_LIMIT_MS: i64 = 3_600 * 1_000;

const MILLIS_PER_MINUTE: i64 = 60 * 1_000;

/// Milliseconds elapsed since the spot was created (negative if the
/// timestamp lies in the future relative to `now`).
fn age(spot: &Spot, now: EpochMillis) -> i64 {
    now.saturating_sub(spot.timestamp)
}

/// Whether `spot` is still inside the visibility window at `now`.
pub fn is_visible(spot: &Spot, now: EpochMillis) -> bool {
    age(spot, now) < TIME_LIMIT_MS
}

/// Project the visible subset of `spots`, preserving input order.
pub fn visible_spots(spots: &[Spot], now: EpochMillis) -> Vec<Spot> {
    spots
        .iter()
        .filter(|spot| is_visible(spot, now))
        .cloned()
        .collect()
}

/// Whole minutes until the spot expires, rounded up and floored at zero.
///
/// `max(0, ceil((TIME_LIMIT_MS - (now - timestamp)) / 60_000))`
pub fn minutes_remaining(spot: &Spot, now: EpochMillis) -> i64 {
    let remaining = TIME_LIMIT_MS.saturating_sub(age(spot, now));
    if remaining <= 0 {
        return 0;
    }
    (remaining + MILLIS_PER_MINUTE - 1) / MILLIS_PER_MINUTE
}

/// The instant at which the spot stops being visible.
pub fn expires_at(spot: &Spot) -> EpochMillis {
    spot.timestamp.saturating_add(TIME_LIMIT_MS)
}
