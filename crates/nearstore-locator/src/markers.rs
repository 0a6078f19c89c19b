//! Keeps a map widget's markers in step with the resolved store list.
//!
//! The synchronizer owns the list of markers it created and is the only thing
//! that removes them, so each [`MarkerSynchronizer::sync`] clears exactly the
//! previous batch before drawing the next one. The widget itself is reached
//! only through [`MapWidget`], so a different map provider can be plugged in
//! without touching resolution logic.

use std::sync::Arc;

use nearstore_core::{Coordinate, ResolvedStore, UserLocation};

use crate::error::MapError;

/// Zoom level used when centering on the user.
const USER_ZOOM: u8 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Store,
    User,
}

/// Callback fired by the widget when a marker is selected.
pub type SelectCallback = Box<dyn Fn() + Send + Sync>;

/// Handler receiving the id of the store whose marker was selected.
pub type StoreSelectHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// The operations the synchronizer needs from a map widget.
pub trait MapWidget {
    type MarkerId: Copy + Eq + std::fmt::Debug;

    /// Whether the widget and its container are still part of the live view.
    fn is_attached(&self) -> bool;

    /// # Errors
    ///
    /// Returns [`MapError`] if the widget refuses the marker.
    fn add_marker(&mut self, at: Coordinate, kind: MarkerKind)
        -> Result<Self::MarkerId, MapError>;

    fn remove_marker(&mut self, marker: Self::MarkerId);

    fn bind_popup(&mut self, marker: Self::MarkerId, html: &str);

    fn on_select(&mut self, marker: Self::MarkerId, callback: SelectCallback);

    fn set_view(&mut self, center: Coordinate, zoom: u8);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Uninitialized,
    Ready,
    Syncing,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced { placed: usize, skipped: usize },
    /// The map was torn down; nothing was touched.
    Detached,
    /// The synchronizer was disposed; nothing was touched.
    Disposed,
}

pub struct MarkerSynchronizer<M: MapWidget> {
    state: SyncState,
    store_markers: Vec<M::MarkerId>,
    user_marker: Option<M::MarkerId>,
    on_select: Option<StoreSelectHandler>,
}

impl<M: MapWidget> Default for MarkerSynchronizer<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MapWidget> MarkerSynchronizer<M> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SyncState::Uninitialized,
            store_markers: Vec::new(),
            user_marker: None,
            on_select: None,
        }
    }

    #[must_use]
    pub fn with_select_handler(mut self, handler: StoreSelectHandler) -> Self {
        self.on_select = Some(handler);
        self
    }

    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Number of store markers currently on the map.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.store_markers.len()
    }

    /// Replace the store markers on `map` with one per entry in `stores`.
    pub fn sync(&mut self, map: &mut M, stores: &[ResolvedStore]) -> SyncOutcome {
        if self.state == SyncState::Disposed {
            return SyncOutcome::Disposed;
        }
        if !map.is_attached() {
            tracing::debug!("map detached, skipping marker sync");
            return SyncOutcome::Detached;
        }

        self.state = SyncState::Syncing;
        for marker in self.store_markers.drain(..) {
            map.remove_marker(marker);
        }

        let mut skipped = 0;
        for store in stores {
            let marker = match map.add_marker(store.coordinate(), MarkerKind::Store) {
                Ok(marker) => marker,
                Err(err) => {
                    tracing::warn!(store_id = store.id(), error = %err, "could not place store marker");
                    skipped += 1;
                    continue;
                }
            };
            map.bind_popup(marker, &store_popup(store));
            if let Some(handler) = &self.on_select {
                let handler = Arc::clone(handler);
                let store_id = store.id().to_owned();
                map.on_select(marker, Box::new(move || handler(&store_id)));
            }
            self.store_markers.push(marker);
        }

        self.state = SyncState::Ready;
        let placed = self.store_markers.len();
        if skipped > 0 {
            tracing::warn!(placed, skipped, "some stores could not be shown on the map");
        }
        SyncOutcome::Synced { placed, skipped }
    }

    /// Move the single user marker to `location` and center the view on it.
    pub fn sync_user_marker(&mut self, map: &mut M, location: &UserLocation) -> SyncOutcome {
        if self.state == SyncState::Disposed {
            return SyncOutcome::Disposed;
        }
        if !map.is_attached() {
            return SyncOutcome::Detached;
        }

        if let Some(old) = self.user_marker.take() {
            map.remove_marker(old);
        }

        let at = location.coordinate();
        map.set_view(at, USER_ZOOM);
        match map.add_marker(at, MarkerKind::User) {
            Ok(marker) => {
                map.bind_popup(marker, &escape_html(&location.describe()));
                self.user_marker = Some(marker);
                if self.state == SyncState::Uninitialized {
                    self.state = SyncState::Ready;
                }
                SyncOutcome::Synced {
                    placed: 1,
                    skipped: 0,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not place user marker");
                SyncOutcome::Synced {
                    placed: 0,
                    skipped: 1,
                }
            }
        }
    }

    /// Remove everything this synchronizer placed and stop tracking. Terminal.
    pub fn dispose(&mut self, map: &mut M) {
        if self.state == SyncState::Disposed {
            return;
        }
        let markers = self.store_markers.drain(..).chain(self.user_marker.take());
        if map.is_attached() {
            for marker in markers {
                map.remove_marker(marker);
            }
        }
        self.state = SyncState::Disposed;
    }
}

fn store_popup(resolved: &ResolvedStore) -> String {
    let store = resolved.store();
    let delivery = if resolved.is_deliverable() {
        "Delivers to your location"
    } else {
        "Outside delivery area"
    };
    format!(
        "<strong>{}</strong><br>{}<br>{}<br>{:.1} mi away &middot; {delivery}",
        escape_html(&store.name),
        escape_html(&store.address),
        escape_html(&store.phone),
        resolved.distance_miles(),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "markers_test.rs"]
mod tests;
