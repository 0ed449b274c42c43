//! Great-circle distance on a spherical Earth.

use medireach_core::types::Coordinates;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers between two points given in degrees.
///
/// Symmetric in its arguments and exactly `0.0` for identical points.
/// Out-of-range or NaN inputs yield a meaningless value but never panic.
pub fn distance_km(lat_a: f64, lng_a: f64, lat_b: f64, lng_b: f64) -> f64 {
    // Absolute deltas keep the result bit-identical when the points swap.
    let dlat = (lat_b - lat_a).abs().to_radians();
    let dlng = (lng_b - lng_a).abs().to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat_a.to_radians().cos() * lat_b.to_radians().cos() * (dlng / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two coordinate pairs.
pub fn between(a: Coordinates, b: Coordinates) -> f64 {
    distance_km(a.lat, a.lng, b.lat, b.lng)
}

/// Render a distance for display: meters below 1 km, otherwise km to one decimal.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round() as i64)
    } else {
        format!("{km:.1} km")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_to_los_angeles() {
        let d = distance_km(40.7128, -74.0060, 34.0522, -118.2437);
        assert!((d - 3936.0).abs() / 3936.0 < 0.02, "got {d}");
    }

    #[test]
    fn test_symmetric_and_zero_on_identity() {
        let pairs = [
            ((30.27, -97.74), (30.30, -97.70)),
            ((-33.8688, 151.2093), (51.5074, -0.1278)),
            ((0.0, 179.9), (0.0, -179.9)),
        ];
        for ((la, oa), (lb, ob)) in pairs {
            let ab = distance_km(la, oa, lb, ob);
            let ba = distance_km(lb, ob, la, oa);
            assert_eq!(ab, ba);
            assert!(ab >= 0.0);
            assert_eq!(distance_km(la, oa, la, oa), 0.0);
        }
    }

    #[test]
    fn test_nan_does_not_panic() {
        let d = distance_km(f64::NAN, 0.0, 10.0, 10.0);
        assert!(d.is_nan());
        let _ = format_distance(d);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.5), "500 m");
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(1.5), "1.5 km");
        assert_eq!(format_distance(12.345), "12.3 km");
    }
}
