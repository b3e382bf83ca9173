use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;
use utoipa::ToSchema;

use crate::error::FieldErrors;

/// A reported WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    #[schema(example = json!(-6.2))]
    pub latitude: f64,
    #[schema(example = 106.816666)]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Collects range errors into `errors`, keyed by the request field name.
    pub fn check_into(&self, errors: &mut FieldErrors) {
        check_axis(errors, "latitude", "Latitude", self.latitude, 90.0);
        check_axis(errors, "longitude", "Longitude", self.longitude, 180.0);
    }
}

fn check_axis(errors: &mut FieldErrors, field: &str, label: &str, value: f64, bound: f64) {
    let message = if !value.is_finite() {
        format!("{label} must be a number")
    } else if value < -bound {
        format!("{label} must be >= -{bound}")
    } else if value > bound {
        format!("{label} must be <= {bound}")
    } else {
        return;
    };
    errors.insert(field.to_string(), message);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkMode {
    Onsite,
    Remote,
}

impl WorkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Onsite => "onsite",
            WorkMode::Remote => "remote",
        }
    }
}

/// One continuous work period of one employee.
///
/// `end_time` is `None` while the session is open. Once closed only the
/// clock-out fields have been added; everything captured at clock-in is
/// left as it was.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AttendanceSession {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub work_date: NaiveDate,
    #[schema(example = "2026-01-01T08:59:12", format = "date-time", value_type = String)]
    pub start_time: NaiveDateTime,
    #[schema(example = "2026-01-01T17:02:40", format = "date-time", value_type = String, nullable = true)]
    pub end_time: Option<NaiveDateTime>,
    pub work_mode: WorkMode,
    #[schema(example = 3, nullable = true)]
    pub office_id: Option<u64>,
    #[schema(example = "Head Office", nullable = true)]
    pub office_name: Option<String>,
    pub clock_in_location: GeoPoint,
    #[schema(nullable = true)]
    pub clock_out_location: Option<GeoPoint>,
    #[schema(nullable = true)]
    pub clock_in_photo_ref: Option<String>,
    #[schema(nullable = true)]
    pub clock_out_photo_ref: Option<String>,
}

#[cfg(test)]
impl AttendanceSession {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Row to insert on clock-in. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub employee_id: u64,
    pub work_date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub work_mode: WorkMode,
    pub office_id: Option<u64>,
    pub office_name: Option<String>,
    pub clock_in_location: GeoPoint,
    pub clock_in_photo_ref: Option<String>,
}

/// Fields written by clock-out.
#[derive(Debug, Clone)]
pub struct SessionEnd {
    pub end_time: NaiveDateTime,
    pub clock_out_location: GeoPoint,
    pub clock_out_photo_ref: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum AttendanceStatus {
    #[serde(rename = "no-session")]
    NoSession,
    #[serde(rename = "clockin")]
    ClockedIn,
    #[serde(rename = "clockout")]
    ClockedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum NextAction {
    #[serde(rename = "clockin")]
    ClockIn,
    #[serde(rename = "clockout")]
    ClockOut,
}

/// Current attendance state, derived from the most recently started session.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({
    "status": "clockin",
    "work_date": "2026-01-01",
    "work_mode": "onsite",
    "last_action_time": "2026-01-01T08:59:12",
    "next_action": "clockout"
}))]
pub struct StatusView {
    pub status: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_mode: Option<WorkMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_action_time: Option<NaiveDateTime>,
    pub next_action: NextAction,
}

impl StatusView {
    pub fn from_latest(latest: Option<&AttendanceSession>) -> Self {
        let Some(session) = latest else {
            return Self {
                status: AttendanceStatus::NoSession,
                work_date: None,
                work_mode: None,
                last_action_time: None,
                next_action: NextAction::ClockIn,
            };
        };

        let (status, last_action_time, next_action) = match session.end_time {
            None => (
                AttendanceStatus::ClockedIn,
                session.start_time,
                NextAction::ClockOut,
            ),
            Some(end_time) => (AttendanceStatus::ClockedOut, end_time, NextAction::ClockIn),
        };

        Self {
            status,
            work_date: Some(session.work_date),
            work_mode: Some(session.work_mode),
            last_action_time: Some(last_action_time),
            next_action,
        }
    }
}

/// Inclusive `work_date` bounds for history queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[cfg(test)]
impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}
