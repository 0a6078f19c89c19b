use nearstore_core::{Coordinate, SkipReason};
use rust_decimal::Decimal;

use super::*;

fn store(id: &str, lat: f64, lng: f64, radius: f64) -> Store {
    Store {
        id: id.to_string(),
        name: format!("Store {id}"),
        address: String::new(),
        phone: String::new(),
        latitude: Some(lat),
        longitude: Some(lng),
        delivery_radius_miles: radius,
        minimum_order: Decimal::ZERO,
        delivery_fee: Decimal::ZERO,
    }
}

fn user() -> UserLocation {
    UserLocation::default_fallback(Coordinate::new(40.7128, -74.0060).unwrap())
}

fn assert_invariants(resolution: &Resolution) {
    for pair in resolution.stores.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.distance_miles() < b.distance_miles()
                || (a.distance_miles() == b.distance_miles() && a.id() <= b.id()),
            "out of order: {} ({}) before {} ({})",
            a.id(),
            a.distance_miles(),
            b.id(),
            b.distance_miles()
        );
    }
    for s in &resolution.stores {
        assert!(s.distance_miles() >= 0.0);
        assert_eq!(
            s.is_deliverable(),
            s.distance_miles() <= s.store().delivery_radius_miles
        );
    }
}

#[test]
fn sorts_nearest_first_and_flags_delivery() {
    let stores = vec![
        store("la", 34.0522, -118.2437, 25.0),
        store("bk", 40.7306, -73.9352, 10.0),
        store("jc", 40.7178, -74.0431, 1.0),
    ];
    let resolution = resolve(&user(), &stores);

    let ids: Vec<&str> = resolution.stores.iter().map(ResolvedStore::id).collect();
    assert_eq!(ids, ["jc", "bk", "la"]);
    assert!(resolution.stores[1].is_deliverable());
    assert!(!resolution.stores[2].is_deliverable());
    assert_eq!(resolution.skipped_count(), 0);
    assert_invariants(&resolution);
}

#[test]
fn equal_distances_break_ties_by_id() {
    let stores = vec![
        store("c", 40.72, -74.0, 5.0),
        store("a", 40.72, -74.0, 5.0),
        store("b", 40.72, -74.0, 5.0),
    ];
    let resolution = resolve(&user(), &stores);
    let ids: Vec<&str> = resolution.stores.iter().map(ResolvedStore::id).collect();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[test]
fn nan_latitude_is_skipped_not_fatal() {
    let stores = vec![
        store("ok", 40.7306, -73.9352, 10.0),
        store("bad", f64::NAN, -73.9, 10.0),
    ];
    let resolution = resolve(&user(), &stores);
    assert_eq!(resolution.stores.len(), 1);
    assert_eq!(resolution.skipped_count(), 1);
    assert_eq!(resolution.skipped[0].id, "bad");
    assert_eq!(resolution.skipped[0].reason, SkipReason::InvalidCoordinates);
}

#[test]
fn missing_coordinates_are_skipped() {
    let mut missing = store("none", 0.0, 0.0, 1.0);
    missing.longitude = None;
    let resolution = resolve(&user(), &[missing]);
    assert!(resolution.stores.is_empty());
    assert_eq!(resolution.skipped[0].reason, SkipReason::MissingCoordinates);
}

#[test]
fn empty_store_list_resolves_to_empty() {
    let resolution = resolve(&user(), &[]);
    assert!(resolution.stores.is_empty());
    assert!(resolution.nearest().is_none());
}

#[test]
fn deliverable_and_within_filters() {
    let stores = vec![
        store("near-no-delivery", 40.7178, -74.0431, 0.0),
        store("mid", 40.7306, -73.9352, 10.0),
        store("far", 34.0522, -118.2437, 25.0),
    ];
    let resolution = resolve(&user(), &stores);

    let deliverable: Vec<&str> = resolution.deliverable().map(ResolvedStore::id).collect();
    assert_eq!(deliverable, ["mid"]);

    let within: Vec<&str> = resolution.within(50.0).map(ResolvedStore::id).collect();
    assert_eq!(within, ["near-no-delivery", "mid"]);

    assert_eq!(resolution.nearest().map(ResolvedStore::id), Some("near-no-delivery"));
}

#[test]
fn invariants_hold_across_a_spread_of_stores() {
    let mut stores = Vec::new();
    for i in 0..40 {
        let lat = -60.0 + f64::from(i) * 3.0;
        let lng = -170.0 + f64::from(i) * 8.5;
        stores.push(store(&format!("s{i:02}"), lat, lng, f64::from(i) * 100.0));
    }
    let resolution = resolve(&user(), &stores);
    assert_eq!(resolution.stores.len(), 40);
    assert_invariants(&resolution);
}

#[test]
fn moving_the_user_recomputes_everything() {
    let stores = vec![
        store("bk", 40.7306, -73.9352, 10.0),
        store("la", 34.0522, -118.2437, 25.0),
    ];
    let in_la = UserLocation::manual_search(Coordinate::new(34.05, -118.25).unwrap(), "LA");
    let resolution = resolve(&in_la, &stores);
    assert_eq!(resolution.nearest().map(ResolvedStore::id), Some("la"));
    assert!(resolution.stores[0].is_deliverable());
    assert!(!resolution.stores[1].is_deliverable());
    assert_invariants(&resolution);
}
