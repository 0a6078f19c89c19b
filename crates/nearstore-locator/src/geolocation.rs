//! Device location acquisition with a tiered accuracy fallback.
//!
//! The platform location service sits behind [`PositionSource`]. The
//! acquirer asks for a high-accuracy (GPS) fix first; if that times out it
//! retries once with a low-accuracy (network/WiFi) request. Any terminal
//! failure is classified as an [`AcquireError`], and [`GeolocationAcquirer::locate`]
//! always hands back a usable location by substituting the caller's default.

use std::future::Future;
use std::time::Duration;

use nearstore_core::{Coordinate, UserLocation};

use crate::error::AcquireError;

const DEFAULT_HIGH_ACCURACY_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_LOW_ACCURACY_TIMEOUT: Duration = Duration::from_secs(15);
/// Oldest platform-cached fix accepted outside an explicit refresh.
const CACHED_FIX_MAX_AGE: Duration = Duration::from_secs(300);

/// Whether a platform-cached position may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    AllowCached,
    /// User-initiated refresh: always demand a fresh fix.
    Refresh,
}

impl Freshness {
    #[must_use]
    pub fn maximum_age(self) -> Duration {
        match self {
            Freshness::AllowCached => CACHED_FIX_MAX_AGE,
            Freshness::Refresh => Duration::ZERO,
        }
    }
}

/// Options forwarded to the platform for a single position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub coordinate: Coordinate,
    pub accuracy_meters: f64,
}

/// Raw failure reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl PositionError {
    /// Map a numeric platform error code (1, 2, 3) to a variant.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(PositionError::PermissionDenied),
            2 => Some(PositionError::PositionUnavailable),
            3 => Some(PositionError::Timeout),
            _ => None,
        }
    }
}

impl From<PositionError> for AcquireError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::PermissionDenied => AcquireError::PermissionDenied,
            PositionError::PositionUnavailable => AcquireError::PositionUnavailable,
            PositionError::Timeout => AcquireError::Timeout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Prompt,
    Denied,
}

/// A platform location service.
pub trait PositionSource {
    /// `false` when the platform has no location capability at all.
    fn is_supported(&self) -> bool;

    /// Current permission state, or `None` if the platform cannot be queried
    /// without prompting.
    fn permission_state(&self) -> impl Future<Output = Option<PermissionState>> + Send;

    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<PositionFix, PositionError>> + Send;
}

/// Result of [`GeolocationAcquirer::locate`]: always a location, plus the
/// failure that forced a fallback, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub location: UserLocation,
    pub failure: Option<AcquireError>,
}

pub struct GeolocationAcquirer<P> {
    source: P,
    high_accuracy_timeout: Duration,
    low_accuracy_timeout: Duration,
}

impl<P: PositionSource> GeolocationAcquirer<P> {
    #[must_use]
    pub fn new(source: P) -> Self {
        Self {
            source,
            high_accuracy_timeout: DEFAULT_HIGH_ACCURACY_TIMEOUT,
            low_accuracy_timeout: DEFAULT_LOW_ACCURACY_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeouts(mut self, high_accuracy: Duration, low_accuracy: Duration) -> Self {
        self.high_accuracy_timeout = high_accuracy;
        self.low_accuracy_timeout = low_accuracy;
        self
    }

    #[must_use]
    pub fn source(&self) -> &P {
        &self.source
    }

    /// Request a GPS-grade fix, falling back to a low-accuracy request if the
    /// first one times out.
    ///
    /// # Errors
    ///
    /// Returns the classified [`AcquireError`] when the high-accuracy request
    /// fails for a reason other than a timeout, or when the low-accuracy
    /// fallback also fails.
    pub async fn acquire_high_accuracy(
        &self,
        timeout: Duration,
        freshness: Freshness,
    ) -> Result<UserLocation, AcquireError> {
        match self.request(true, timeout, freshness).await {
            Err(AcquireError::Timeout) => {
                tracing::warn!(
                    timeout = ?timeout,
                    "high-accuracy fix timed out, retrying with low accuracy"
                );
                self.acquire_low_accuracy(self.low_accuracy_timeout, freshness)
                    .await
            }
            other => other,
        }
    }

    /// Request a network-grade fix.
    ///
    /// # Errors
    ///
    /// Returns the classified [`AcquireError`]; every failure here is terminal.
    pub async fn acquire_low_accuracy(
        &self,
        timeout: Duration,
        freshness: Freshness,
    ) -> Result<UserLocation, AcquireError> {
        self.request(false, timeout, freshness).await
    }

    /// Run the full acquisition chain and fall back to `fallback` on any
    /// terminal failure.
    pub async fn locate(&self, freshness: Freshness, fallback: Coordinate) -> Located {
        match self
            .acquire_high_accuracy(self.high_accuracy_timeout, freshness)
            .await
        {
            Ok(location) => {
                tracing::debug!(
                    source = %location.source(),
                    accuracy_meters = location.accuracy_meters(),
                    "acquired device location"
                );
                Located {
                    location,
                    failure: None,
                }
            }
            Err(err) => {
                tracing::warn!(
                    reason = err.code(),
                    fallback = %fallback,
                    "location unavailable, using default"
                );
                Located {
                    location: UserLocation::default_fallback(fallback),
                    failure: Some(err),
                }
            }
        }
    }

    async fn request(
        &self,
        high_accuracy: bool,
        timeout: Duration,
        freshness: Freshness,
    ) -> Result<UserLocation, AcquireError> {
        if !self.source.is_supported() {
            return Err(AcquireError::Unsupported);
        }

        if self.source.permission_state().await == Some(PermissionState::Denied) {
            return Err(AcquireError::PermissionDenied);
        }

        let options = PositionOptions {
            enable_high_accuracy: high_accuracy,
            timeout,
            maximum_age: freshness.maximum_age(),
        };

        // The platform is asked to honour `timeout` itself; this bound covers
        // sources that never call back.
        let fix = match tokio::time::timeout(timeout, self.source.current_position(&options)).await
        {
            Ok(Ok(fix)) => fix,
            Ok(Err(err)) => return Err(err.into()),
            Err(_elapsed) => return Err(AcquireError::Timeout),
        };

        if !fix.coordinate.is_valid() || !fix.accuracy_meters.is_finite() {
            tracing::warn!(
                latitude = fix.coordinate.latitude,
                longitude = fix.coordinate.longitude,
                "platform returned an unusable fix"
            );
            return Err(AcquireError::PositionUnavailable);
        }

        Ok(UserLocation::from_gps(
            fix.coordinate,
            high_accuracy,
            fix.accuracy_meters,
        ))
    }
}

#[cfg(test)]
#[path = "geolocation_test.rs"]
mod tests;
