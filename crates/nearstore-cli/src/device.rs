//! Position source for hosts without a location service.

use nearstore_locator::{
    PermissionState, PositionError, PositionFix, PositionOptions, PositionSource,
};

/// A terminal has no GPS or network positioning, so every request through
/// this source ends in the configured default location.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct HostPositionSource;

impl PositionSource for HostPositionSource {
    fn is_supported(&self) -> bool {
        false
    }

    async fn permission_state(&self) -> Option<PermissionState> {
        None
    }

    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<PositionFix, PositionError> {
        Err(PositionError::PositionUnavailable)
    }
}
