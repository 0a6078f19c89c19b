//! Rank stores by distance from the user and flag delivery eligibility.

use nearstore_core::{ResolvedStore, SkippedStore, Store, UserLocation};

/// Output of [`resolve`]: stores sorted nearest-first plus the records that
/// could not be placed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub stores: Vec<ResolvedStore>,
    pub skipped: Vec<SkippedStore>,
}

impl Resolution {
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    #[must_use]
    pub fn nearest(&self) -> Option<&ResolvedStore> {
        self.stores.first()
    }

    pub fn deliverable(&self) -> impl Iterator<Item = &ResolvedStore> {
        self.stores.iter().filter(|s| s.is_deliverable())
    }

    /// Stores no farther than `miles`, still nearest-first.
    pub fn within(&self, miles: f64) -> impl Iterator<Item = &ResolvedStore> {
        self.stores
            .iter()
            .take_while(move |s| s.distance_miles() <= miles)
    }
}

/// Annotate every store with its distance from `user` and sort ascending by
/// distance, breaking ties by store id.
///
/// Stores with missing or invalid coordinates are left out and listed in
/// [`Resolution::skipped`]; they never fail the call.
#[must_use]
pub fn resolve(user: &UserLocation, stores: &[Store]) -> Resolution {
    let origin = user.coordinate();
    let mut resolution = Resolution::default();

    for store in stores {
        match ResolvedStore::new(store.clone(), &origin) {
            Ok(resolved) => resolution.stores.push(resolved),
            Err(skipped) => {
                tracing::warn!(
                    store_id = %skipped.id,
                    reason = %skipped.reason,
                    "skipping store with unusable coordinates"
                );
                resolution.skipped.push(skipped);
            }
        }
    }

    resolution.stores.sort_by(|a, b| {
        a.distance_miles()
            .total_cmp(&b.distance_miles())
            .then_with(|| a.id().cmp(b.id()))
    });

    tracing::debug!(
        origin = %origin,
        source = %user.source(),
        resolved = resolution.stores.len(),
        skipped = resolution.skipped.len(),
        "resolved nearby stores"
    );
    resolution
}

#[cfg(test)]
#[path = "proximity_test.rs"]
mod tests;
