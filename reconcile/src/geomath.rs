//! Utilitaires de distance géodésique
//!
//! Formule de haversine sur la sphère de rayon moyen WGS84. Pur et sans
//! état: la reprojection CRS vit dans [`crate::reproject`].

/// Rayon moyen de la Terre en mètres (sphère WGS84)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance orthodromique en mètres entre deux points lat/lon (degrés
/// décimaux).
///
/// Symétrique (`d(a,b) == d(b,a)`) et `d(a,a) == 0`. Aucune validation de
/// plage au-delà des nombres finis: une coordonnée non finie propage NaN,
/// que les appelants filtrent en amont.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    c * EARTH_RADIUS_M
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero_for_same_point() {
        assert_eq!(haversine_distance_m(22.28, 114.16, 22.28, 114.16), 0.0);
        assert_eq!(haversine_distance_m(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let d1 = haversine_distance_m(22.2800, 114.1600, 22.3193, 114.1694);
        let d2 = haversine_distance_m(22.3193, 114.1694, 22.2800, 114.1600);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_control_point_eleven_meters() {
        // Régression: 0.0001 degré de latitude ≈ 11 m, pas 100 m, pas 0 m
        let d = haversine_distance_m(22.2800, 114.1600, 22.2801, 114.1600);
        assert!(d > 10.0 && d < 12.0, "expected ~11 m, got {}", d);
    }

    #[test]
    fn test_known_cross_harbour_distance() {
        // Central (22.2819, 114.1582) -> Tsim Sha Tsui (22.2976, 114.1722),
        // environ 2.2 km à vol d'oiseau
        let d = haversine_distance_m(22.2819, 114.1582, 22.2976, 114.1722);
        assert!(d > 2_000.0 && d < 2_500.0, "got {}", d);
    }

    #[test]
    fn test_non_finite_propagates_nan() {
        assert!(haversine_distance_m(f64::NAN, 114.16, 22.28, 114.16).is_nan());
    }
}
