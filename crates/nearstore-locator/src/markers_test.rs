use std::collections::BTreeMap;
use std::sync::Mutex;

use nearstore_core::Store;
use rust_decimal::Decimal;

use super::*;

struct FakeMarker {
    at: Coordinate,
    kind: MarkerKind,
    popup: Option<String>,
    on_select: Option<SelectCallback>,
}

#[derive(Default)]
struct FakeMap {
    detached: bool,
    next_id: u32,
    markers: BTreeMap<u32, FakeMarker>,
    view: Option<(Coordinate, u8)>,
    /// Latitudes the widget refuses to draw.
    reject_latitude: Option<f64>,
    removed: Vec<u32>,
}

impl FakeMap {
    fn count(&self, kind: MarkerKind) -> usize {
        self.markers.values().filter(|m| m.kind == kind).count()
    }

    fn click(&self, id: u32) {
        if let Some(cb) = self.markers.get(&id).and_then(|m| m.on_select.as_ref()) {
            cb();
        }
    }

    fn store_ids(&self) -> Vec<u32> {
        self.markers
            .iter()
            .filter(|(_, m)| m.kind == MarkerKind::Store)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl MapWidget for FakeMap {
    type MarkerId = u32;

    fn is_attached(&self) -> bool {
        !self.detached
    }

    fn add_marker(&mut self, at: Coordinate, kind: MarkerKind) -> Result<u32, MapError> {
        if self.reject_latitude == Some(at.latitude) {
            return Err(MapError::MarkerRejected {
                latitude: at.latitude,
                longitude: at.longitude,
                reason: "test rejection".to_string(),
            });
        }
        self.next_id += 1;
        self.markers.insert(
            self.next_id,
            FakeMarker {
                at,
                kind,
                popup: None,
                on_select: None,
            },
        );
        Ok(self.next_id)
    }

    fn remove_marker(&mut self, marker: u32) {
        self.markers.remove(&marker);
        self.removed.push(marker);
    }

    fn bind_popup(&mut self, marker: u32, html: &str) {
        if let Some(m) = self.markers.get_mut(&marker) {
            m.popup = Some(html.to_string());
        }
    }

    fn on_select(&mut self, marker: u32, callback: SelectCallback) {
        if let Some(m) = self.markers.get_mut(&marker) {
            m.on_select = Some(callback);
        }
    }

    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.view = Some((center, zoom));
    }
}

fn user_coord() -> Coordinate {
    Coordinate::new(40.7128, -74.0060).unwrap()
}

fn resolved(id: &str, lat: f64, lng: f64) -> ResolvedStore {
    let store = Store {
        id: id.to_string(),
        name: format!("Fresh & Co {id}"),
        address: "12 <Elm> St".to_string(),
        phone: "555-0100".to_string(),
        latitude: Some(lat),
        longitude: Some(lng),
        delivery_radius_miles: 10.0,
        minimum_order: Decimal::ZERO,
        delivery_fee: Decimal::ZERO,
    };
    ResolvedStore::new(store, &user_coord()).unwrap()
}

fn three_stores() -> Vec<ResolvedStore> {
    vec![
        resolved("a", 40.7306, -73.9352),
        resolved("b", 40.7178, -74.0431),
        resolved("c", 40.6782, -73.9442),
    ]
}

#[test]
fn first_sync_places_one_marker_per_store() {
    let mut map = FakeMap::default();
    let mut sync = MarkerSynchronizer::new();
    assert_eq!(sync.state(), SyncState::Uninitialized);

    let outcome = sync.sync(&mut map, &three_stores());
    assert_eq!(
        outcome,
        SyncOutcome::Synced {
            placed: 3,
            skipped: 0
        }
    );
    assert_eq!(map.count(MarkerKind::Store), 3);
    assert_eq!(sync.tracked_count(), 3);
    assert_eq!(sync.state(), SyncState::Ready);
}

#[test]
fn repeated_sync_does_not_accumulate_markers() {
    let mut map = FakeMap::default();
    let mut sync = MarkerSynchronizer::new();
    let stores = three_stores();

    sync.sync(&mut map, &stores);
    let first_ids = map.store_ids();
    sync.sync(&mut map, &stores);

    assert_eq!(map.count(MarkerKind::Store), stores.len());
    assert_eq!(map.removed, first_ids);
}

#[test]
fn sync_leaves_foreign_markers_alone() {
    let mut map = FakeMap::default();
    let foreign = map.add_marker(user_coord(), MarkerKind::Store).unwrap();
    let mut sync = MarkerSynchronizer::new();

    sync.sync(&mut map, &three_stores());
    sync.sync(&mut map, &three_stores()[..1]);

    assert!(map.markers.contains_key(&foreign));
    assert_eq!(map.count(MarkerKind::Store), 2);
}

#[test]
fn detached_map_is_left_untouched() {
    let mut map = FakeMap::default();
    let mut sync = MarkerSynchronizer::new();
    sync.sync(&mut map, &three_stores());

    map.detached = true;
    let outcome = sync.sync(&mut map, &three_stores()[..1]);
    assert_eq!(outcome, SyncOutcome::Detached);
    assert_eq!(map.count(MarkerKind::Store), 3);
    assert!(map.removed.is_empty());
    assert_eq!(sync.state(), SyncState::Ready);
}

#[test]
fn rejected_marker_is_skipped_and_counted() {
    let mut map = FakeMap {
        reject_latitude: Some(40.7178),
        ..FakeMap::default()
    };
    let mut sync = MarkerSynchronizer::new();

    let outcome = sync.sync(&mut map, &three_stores());
    assert_eq!(
        outcome,
        SyncOutcome::Synced {
            placed: 2,
            skipped: 1
        }
    );
    assert_eq!(sync.tracked_count(), 2);
}

#[test]
fn widget_rejection_is_the_only_skip_path() {
    let mut map = FakeMap {
        reject_latitude: Some(40.7306),
        ..FakeMap::default()
    };
    let mut sync = MarkerSynchronizer::new();
    let stores = [resolved("a", 40.7306, -73.9352), resolved("d", 40.7306, -73.99)];

    let outcome = sync.sync(&mut map, &stores);
    assert_eq!(
        outcome,
        SyncOutcome::Synced {
            placed: 0,
            skipped: 2
        }
    );
    assert_eq!(sync.state(), SyncState::Ready);
    assert!(map.markers.is_empty());

    map.reject_latitude = None;
    let outcome = sync.sync(&mut map, &stores);
    assert_eq!(
        outcome,
        SyncOutcome::Synced {
            placed: 2,
            skipped: 0
        }
    );
}

#[test]
fn popup_summarizes_store_and_escapes_html() {
    let mut map = FakeMap::default();
    let mut sync = MarkerSynchronizer::new();
    sync.sync(&mut map, &three_stores()[..1]);

    let popup = map.markers.values().next().unwrap().popup.clone().unwrap();
    assert!(popup.contains("Fresh &amp; Co a"), "{popup}");
    assert!(popup.contains("12 &lt;Elm&gt; St"), "{popup}");
    assert!(popup.contains("555-0100"));
    assert!(popup.contains(" mi away"));
    assert!(popup.contains("Delivers to your location"));
}

#[test]
fn selecting_a_marker_reports_its_store_id() {
    let selected = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = Arc::clone(&selected);
    let mut map = FakeMap::default();
    let mut sync = MarkerSynchronizer::new().with_select_handler(Arc::new(move |id: &str| {
        sink.lock().unwrap().push(id.to_string());
    }));

    sync.sync(&mut map, &three_stores());
    let ids = map.store_ids();
    map.click(ids[2]);
    map.click(ids[0]);

    assert_eq!(*selected.lock().unwrap(), ["c", "a"]);
}

#[test]
fn user_marker_is_replaced_and_view_recentred() {
    let mut map = FakeMap::default();
    let mut sync = MarkerSynchronizer::new();

    let first = UserLocation::default_fallback(user_coord());
    let moved = UserLocation::manual_search(Coordinate::new(40.65, -73.95).unwrap(), "Flatbush");
    sync.sync_user_marker(&mut map, &first);
    sync.sync_user_marker(&mut map, &moved);

    assert_eq!(map.count(MarkerKind::User), 1);
    let (center, zoom) = map.view.unwrap();
    assert_eq!(center, moved.coordinate());
    assert_eq!(zoom, USER_ZOOM);
    let user = map
        .markers
        .values()
        .find(|m| m.kind == MarkerKind::User)
        .unwrap();
    assert_eq!(user.at, moved.coordinate());
}

#[test]
fn store_sync_keeps_user_marker() {
    let mut map = FakeMap::default();
    let mut sync = MarkerSynchronizer::new();
    sync.sync_user_marker(&mut map, &UserLocation::default_fallback(user_coord()));
    sync.sync(&mut map, &three_stores());
    sync.sync(&mut map, &three_stores());
    assert_eq!(map.count(MarkerKind::User), 1);
    assert_eq!(map.count(MarkerKind::Store), 3);
}

#[test]
fn dispose_clears_markers_and_is_terminal() {
    let mut map = FakeMap::default();
    let mut sync = MarkerSynchronizer::new();
    sync.sync_user_marker(&mut map, &UserLocation::default_fallback(user_coord()));
    sync.sync(&mut map, &three_stores());

    sync.dispose(&mut map);
    assert!(map.markers.is_empty());
    assert_eq!(sync.state(), SyncState::Disposed);

    assert_eq!(sync.sync(&mut map, &three_stores()), SyncOutcome::Disposed);
    assert!(map.markers.is_empty());
}

#[test]
fn dispose_after_teardown_does_not_touch_map() {
    let mut map = FakeMap::default();
    let mut sync = MarkerSynchronizer::new();
    sync.sync(&mut map, &three_stores());

    map.detached = true;
    sync.dispose(&mut map);
    assert!(map.removed.is_empty());
    assert_eq!(sync.tracked_count(), 0);
    assert_eq!(sync.state(), SyncState::Disposed);
}

#[test]
fn escape_html_handles_all_special_characters() {
    assert_eq!(
        escape_html(r#"<a href="x">'&'</a>"#),
        "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
    );
}
