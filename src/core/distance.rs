use crate::models::{DiscoverProfile, Location};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two locations in kilometers
#[inline]
pub fn haversine_distance(from: &Location, to: &Location) -> f64 {
    let from_lat = from.lat.to_radians();
    let to_lat = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_long = (to.long - from.long).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + from_lat.cos() * to_lat.cos() * (delta_long / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Fill in each candidate's distance from `origin` in whole kilometers and
/// order them nearest first. Equal distances keep their query order.
pub fn sort_by_distance(profiles: &mut [DiscoverProfile], origin: &Location) {
    for profile in profiles.iter_mut() {
        profile.distance_km = haversine_distance(origin, &profile.location) as u32;
    }

    profiles.sort_by_key(|p| p.distance_km);
}
