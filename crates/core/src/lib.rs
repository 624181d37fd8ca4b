//! Quiet Finder domain core.
//!
//! Spot model, expiry window, campus map constants and the store seam shared
//! by the server and client crates. No I/O lives here.

pub mod campus;
pub mod clock;
pub mod error;
pub mod expiry;
pub mod spot;
pub mod store;
pub mod types;
pub mod wire;
