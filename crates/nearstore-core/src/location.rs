use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Where a [`UserLocation`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationSource {
    GpsHighAccuracy,
    GpsLowAccuracy,
    ManualSearch,
    Saved,
    DefaultFallback,
}

impl LocationSource {
    #[must_use]
    pub fn is_gps(self) -> bool {
        matches!(self, Self::GpsHighAccuracy | Self::GpsLowAccuracy)
    }
}

impl std::fmt::Display for LocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationSource::GpsHighAccuracy => write!(f, "gps-high-accuracy"),
            LocationSource::GpsLowAccuracy => write!(f, "gps-low-accuracy"),
            LocationSource::ManualSearch => write!(f, "manual-search"),
            LocationSource::Saved => write!(f, "saved"),
            LocationSource::DefaultFallback => write!(f, "default-fallback"),
        }
    }
}

/// The user's position as currently understood by the app.
///
/// `accuracy_meters` is only ever populated for GPS-derived locations; the
/// constructors enforce that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    coordinate: Coordinate,
    source: LocationSource,
    accuracy_meters: Option<f64>,
    address: Option<String>,
}

impl UserLocation {
    #[must_use]
    pub fn from_gps(coordinate: Coordinate, high_accuracy: bool, accuracy_meters: f64) -> Self {
        let source = if high_accuracy {
            LocationSource::GpsHighAccuracy
        } else {
            LocationSource::GpsLowAccuracy
        };
        Self {
            coordinate,
            source,
            accuracy_meters: Some(accuracy_meters),
            address: None,
        }
    }

    #[must_use]
    pub fn manual_search(coordinate: Coordinate, address: impl Into<String>) -> Self {
        Self {
            coordinate,
            source: LocationSource::ManualSearch,
            accuracy_meters: None,
            address: Some(address.into()),
        }
    }

    #[must_use]
    pub fn saved(coordinate: Coordinate, address: Option<String>) -> Self {
        Self {
            coordinate,
            source: LocationSource::Saved,
            accuracy_meters: None,
            address,
        }
    }

    #[must_use]
    pub fn default_fallback(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            source: LocationSource::DefaultFallback,
            accuracy_meters: None,
            address: None,
        }
    }

    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    #[must_use]
    pub fn source(&self) -> LocationSource {
        self.source
    }

    #[must_use]
    pub fn accuracy_meters(&self) -> Option<f64> {
        self.accuracy_meters
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Short status line for display, e.g. `"gps-high-accuracy (±12 m)"`.
    #[must_use]
    pub fn describe(&self) -> String {
        match (&self.address, self.accuracy_meters) {
            (Some(address), _) => format!("{} ({address})", self.source),
            (None, Some(acc)) => format!("{} (±{acc:.0} m)", self.source),
            (None, None) => self.source.to_string(),
        }
    }
}
