use crate::config::constants::EARTH_RADIUS_M;
use crate::data::coords::{Coordinate, LatLng};

/// Equirectangular projection of `(lat, lng)` into meters around
/// `(ref_lat, ref_lng)`. Only accurate near the reference point.
pub fn project_to_plane(lat: f64, lng: f64, ref_lat: f64, ref_lng: f64) -> Coordinate {
    let d_lat = (lat - ref_lat).to_radians();
    let d_lng = (lng - ref_lng).to_radians();

    let x = EARTH_RADIUS_M * d_lng * ref_lat.to_radians().cos();
    let y = EARTH_RADIUS_M * d_lat;

    Coordinate::new(x, y)
}

pub fn project_latlng(pos: &LatLng, reference: &LatLng) -> Coordinate {
    project_to_plane(pos.lat, pos.lng, reference.lat, reference.lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::{DEFAULT_REFERENCE_LAT, DEFAULT_REFERENCE_LNG};

    #[test]
    fn test_reference_projects_to_origin() {
        let c = project_to_plane(
            DEFAULT_REFERENCE_LAT,
            DEFAULT_REFERENCE_LNG,
            DEFAULT_REFERENCE_LAT,
            DEFAULT_REFERENCE_LNG,
        );
        assert_eq!(c, Coordinate::new(0.0, 0.0));
    }

    #[test]
    fn test_projection_is_linear_in_latitude() {
        let one = project_to_plane(DEFAULT_REFERENCE_LAT + 0.001, DEFAULT_REFERENCE_LNG, DEFAULT_REFERENCE_LAT, DEFAULT_REFERENCE_LNG);
        let two = project_to_plane(DEFAULT_REFERENCE_LAT + 0.002, DEFAULT_REFERENCE_LNG, DEFAULT_REFERENCE_LAT, DEFAULT_REFERENCE_LNG);
        assert_eq!(one.x, 0.0);
        assert!((two.y / one.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_hundredth_degree_north_is_about_1112_meters() {
        let c = project_to_plane(DEFAULT_REFERENCE_LAT + 0.01, DEFAULT_REFERENCE_LNG, DEFAULT_REFERENCE_LAT, DEFAULT_REFERENCE_LNG);
        assert!((c.y - 1111.95).abs() < 0.5, "got {}", c.y);
    }

    #[test]
    fn test_longitude_shrinks_with_latitude() {
        let at_equator = project_to_plane(0.0, 0.01, 0.0, 0.0);
        let at_60 = project_to_plane(60.0, 0.01, 60.0, 0.0);
        assert!((at_60.x / at_equator.x - 0.5).abs() < 1e-9);
    }
}
