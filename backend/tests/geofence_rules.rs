//! Geofence behavior: inclusive boundary, deterministic roaming match,
//! haversine distances.

use chrono::Utc;

use presensi_backend::error::AppError;
use presensi_backend::models::work_location::WorkLocation;
use presensi_backend::services::geofence::{check_fixed, match_roaming, within_radius};
use presensi_backend::utils::geo::haversine_distance;

fn location(id: &str, lat: f64, lon: f64, radius: f64) -> WorkLocation {
    let now = Utc::now();
    WorkLocation {
        id: id.into(),
        name: format!("Site {}", id),
        latitude: lat,
        longitude: lon,
        radius_meters: radius,
        timezone: "Asia/Jakarta".into(),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn a_point_exactly_on_the_radius_is_accepted() {
    let offset = 0.001; // ~111.2 m of latitude
    let distance = haversine_distance(offset, 0.0, 0.0, 0.0);

    let site = location("hq", 0.0, 0.0, distance);
    assert!(within_radius(offset, 0.0, &site));
    assert!(check_fixed(offset, 0.0, &site).is_ok());
}

#[test]
fn one_meter_past_the_radius_is_rejected_with_the_distance() {
    let offset = 0.001;
    let distance = haversine_distance(offset, 0.0, 0.0, 0.0);

    let site = location("hq", 0.0, 0.0, distance - 1.0);
    let err = check_fixed(offset, 0.0, &site).unwrap_err();
    match err {
        AppError::ForbiddenWithDetails(message, details) => {
            assert!(message.contains("range"));
            let reported = details["distance_meters"].as_i64().unwrap();
            assert_eq!(reported, distance.round() as i64);
            assert!(details["allowed_radius_meters"].as_f64().unwrap() < distance);
        }
        other => panic!("expected detailed forbidden error, got {:?}", other),
    }
}

#[test]
fn roaming_match_is_first_containing_site_in_id_order() {
    let sites = vec![
        location("a", 50.0, 50.0, 10.0),
        location("b", 0.0, 0.0, 1000.0),
        location("c", 0.0, 0.0, 5000.0),
    ];
    assert_eq!(match_roaming(0.0, 0.0, &sites).unwrap().id, "b");
}

#[test]
fn roaming_with_no_containing_site_matches_nothing() {
    let sites = vec![location("a", 50.0, 50.0, 10.0)];
    assert!(match_roaming(0.0, 0.0, &sites).is_none());
}

#[test]
fn haversine_matches_known_city_pair() {
    // Jakarta (Monas) to Bandung (Gedung Sate), roughly 118 km.
    let d = haversine_distance(-6.1754, 106.8272, -6.9025, 107.6186);
    assert!((d - 118_000.0).abs() < 4_000.0, "got {}", d);
}
