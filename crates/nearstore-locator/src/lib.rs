//! Nearby-store resolution for the storefront.
//!
//! Acquires the user's location ([`geolocation`]), keeps exactly one active
//! location ([`tracker`]), ranks stores by distance with delivery flags
//! ([`proximity`]), and mirrors the result onto a map widget ([`markers`]).
//! [`geocode`] and [`api`] are thin clients for the external geocoder and
//! the backend store endpoints.

pub mod api;
pub mod error;
pub mod geocode;
pub mod geolocation;
pub mod markers;
pub mod proximity;
mod retry;
pub mod tracker;

pub use api::StoreApiClient;
pub use error::{AcquireError, ApiError, GeocodeError, GeocodeFailure, MapError};
pub use geocode::{GeocodeClient, GeocodeMatch};
pub use geolocation::{
    Freshness, GeolocationAcquirer, Located, PermissionState, PositionError, PositionFix,
    PositionOptions, PositionSource,
};
pub use markers::{
    MapWidget, MarkerKind, MarkerSynchronizer, SelectCallback, StoreSelectHandler, SyncOutcome,
    SyncState,
};
pub use proximity::{resolve, Resolution};
pub use tracker::{ActiveLocation, Completion, RequestToken};
