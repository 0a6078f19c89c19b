//! The single active user location and stale-result protection.
//!
//! Platform position requests cannot be cancelled, so a slow request may
//! finish after a newer one. Every request takes a [`RequestToken`]; only
//! the token from the most recent [`ActiveLocation::begin`] may install its
//! result.

use nearstore_core::UserLocation;

/// Opaque handle identifying one acquisition or search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

impl RequestToken {
    #[must_use]
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Installed,
    /// A newer request started after this one; the result was dropped.
    Superseded,
}

#[derive(Debug, Default)]
pub struct ActiveLocation {
    generation: u64,
    current: Option<UserLocation>,
}

impl ActiveLocation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-known location (e.g. a saved one).
    #[must_use]
    pub fn with_initial(location: UserLocation) -> Self {
        Self {
            generation: 0,
            current: Some(location),
        }
    }

    /// Register a new request. Any token handed out earlier becomes stale.
    pub fn begin(&mut self) -> RequestToken {
        self.generation += 1;
        RequestToken(self.generation)
    }

    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.generation
    }

    /// Install `location` if `token` is still the latest request. The
    /// previous location is replaced outright.
    pub fn complete(&mut self, token: RequestToken, location: UserLocation) -> Completion {
        if !self.is_current(token) {
            tracing::debug!(
                stale = token.0,
                current = self.generation,
                source = %location.source(),
                "ignoring superseded location result"
            );
            return Completion::Superseded;
        }
        self.current = Some(location);
        Completion::Installed
    }

    #[must_use]
    pub fn current(&self) -> Option<&UserLocation> {
        self.current.as_ref()
    }
}
