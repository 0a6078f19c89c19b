use std::time::Duration;

use thiserror::Error;

/// Terminal outcome of a location acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AcquireError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("timed out waiting for a position fix")]
    Timeout,

    #[error("location services are not supported on this platform")]
    Unsupported,
}

impl AcquireError {
    /// Kebab-case classification tag, stable for logs and UI lookups.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            AcquireError::PermissionDenied => "permission-denied",
            AcquireError::PositionUnavailable => "position-unavailable",
            AcquireError::Timeout => "timeout",
            AcquireError::Unsupported => "unsupported",
        }
    }

    /// Actionable message for the user.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            AcquireError::PermissionDenied => {
                "Location access was denied. Search for your address to find nearby stores."
            }
            AcquireError::PositionUnavailable => {
                "Your location could not be determined. Showing stores near the default area."
            }
            AcquireError::Timeout => {
                "Finding your location took too long. Showing stores near the default area."
            }
            AcquireError::Unsupported => {
                "Location services are not available. Search for your address instead."
            }
        }
    }
}

/// Broad classification of a failed address search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodeFailure {
    NotFound,
    NetworkError,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from geocoder")]
    UnexpectedStatus { status: u16 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no match for address \"{query}\"")]
    NotFound { query: String },

    #[error("invalid geocoder URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl GeocodeError {
    #[must_use]
    pub fn kind(&self) -> GeocodeFailure {
        match self {
            GeocodeError::NotFound { .. } => GeocodeFailure::NotFound,
            GeocodeError::Http(_)
            | GeocodeError::UnexpectedStatus { .. }
            | GeocodeError::Deserialize { .. }
            | GeocodeError::InvalidBaseUrl { .. } => GeocodeFailure::NetworkError,
        }
    }
}

/// Errors from the backend store API client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("resource not found: {url}")]
    NotFound { url: String },

    /// `retry_after` carries the server's `Retry-After` wait when it sent one.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        retry_after: Option<Duration>,
    },

    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    /// How long the server asked us to wait before trying again, if it said.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ApiError::UnexpectedStatus { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Failure reported by a map widget.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("map widget rejected marker at {latitude}, {longitude}: {reason}")]
    MarkerRejected {
        latitude: f64,
        longitude: f64,
        reason: String,
    },
}
