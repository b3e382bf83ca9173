use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::attendance::GeoPoint;

/// A named office and the circular geofence around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "name": "Head Office",
    "latitude": -6.2,
    "longitude": 106.816666,
    "radius_meters": 150.0,
    "created_at": "2026-01-01T00:00:00"
}))]
pub struct OfficeLocation {
    pub id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    #[schema(format = "date-time", value_type = String, nullable = true)]
    pub created_at: Option<NaiveDateTime>,
}

impl OfficeLocation {
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}
