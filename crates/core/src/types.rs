/// Spot identifiers are opaque strings assigned by the store.
pub type SpotId = String;

/// Timestamps are milliseconds since the Unix epoch (UTC).
pub type EpochMillis = i64;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> EpochMillis {
    chrono::Utc::now().timestamp_millis()
}
