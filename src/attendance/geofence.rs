//! Office proximity classification.
//!
//! Pure and synchronous: the same point and office list always yield the same
//! classification.

use crate::model::attendance::{GeoPoint, WorkMode};
use crate::model::office_location::OfficeLocation;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points on a spherical Earth.
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    // rounding can push h just past 1 for antipodal points
    let h = ((d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2))
    .min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification<'a> {
    pub mode: WorkMode,
    pub office: Option<&'a OfficeLocation>,
}

/// Classifies `point` against `offices` in the order given.
///
/// The first office whose geofence contains the point wins, even when a later
/// office is nearer. No match means remote.
pub fn classify(point: GeoPoint, offices: &[OfficeLocation]) -> Classification<'_> {
    let office = offices
        .iter()
        .find(|office| haversine_distance(point, office.center()) <= office.radius_meters);

    Classification {
        mode: if office.is_some() {
            WorkMode::Onsite
        } else {
            WorkMode::Remote
        },
        office,
    }
}
