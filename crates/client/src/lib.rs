//! Quiet Finder map client.
//!
//! The spot map widget ([`widget`], [`view`]), the runtime that keeps it in
//! sync with a [`SpotStore`](quietfinder_core::store::SpotStore) ([`runtime`]),
//! and a store implementation that talks to the API server ([`remote`]).

pub mod config;
pub mod reconnect;
pub mod remote;
pub mod runtime;
pub mod view;
pub mod widget;

pub use remote::RemoteStore;
pub use runtime::{mount, MountedWidget};
pub use widget::{Banner, FormError, SpotMap};
