//! Geographic utilities: great-circle distance and landmark proximity.

use crate::{GpsPoint, Landmark};

/// Mean Earth radius in kilometres used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometres (haversine formula).
///
/// # Example
/// ```
/// use commute_ledger::GpsPoint;
/// use commute_ledger::geo_utils::haversine_km;
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
/// let km = haversine_km(&london, &paris);
/// assert!((km - 343.5).abs() < 5.0);
/// ```
pub fn haversine_km(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = (p2.latitude - p1.latitude).to_radians();
    let dlon = (p2.longitude - p1.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Check whether a raw `[lat, lng]` pair lies within `radius_km` of a landmark.
///
/// Absent or short pairs are never near anything; this function does not fail.
/// The radius is inclusive.
pub fn is_near(latlng: Option<&[f64]>, landmark: &Landmark, radius_km: f64) -> bool {
    match latlng.and_then(GpsPoint::from_latlng) {
        Some(point) => haversine_km(&point, &landmark.point()) <= radius_km,
        None => false,
    }
}
