use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestType {
    AnnualLeave,
    Sick,
    Other,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::AnnualLeave => "annual_leave",
            RequestType::Sick => "sick",
            RequestType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

/// An employee's request to be excused from clocking in for a date range.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 4,
    "employee_id": 1000,
    "request_type": "sick",
    "description": "Flu",
    "start_date": "2026-01-05",
    "end_date": "2026-01-06",
    "latitude": null,
    "longitude": null,
    "status": "pending",
    "created_at": "2026-01-04T20:11:00",
    "updated_at": "2026-01-04T20:11:00"
}))]
pub struct AttendanceRequest {
    pub id: u64,
    pub employee_id: u64,
    pub request_type: RequestType,
    pub description: String,
    #[schema(format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: RequestStatus,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: NaiveDateTime,
}

/// Raw `attendance_requests` row; enum columns are stored as text.
#[derive(Debug, sqlx::FromRow)]
pub struct AttendanceRequestRow {
    pub id: u64,
    pub employee_id: u64,
    pub request_type: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<AttendanceRequestRow> for AttendanceRequest {
    type Error = sqlx::Error;

    fn try_from(row: AttendanceRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            employee_id: row.employee_id,
            request_type: row
                .request_type
                .parse()
                .map_err(|e: strum::ParseError| sqlx::Error::Decode(Box::new(e)))?,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            latitude: row.latitude,
            longitude: row.longitude,
            status: row
                .status
                .parse()
                .map_err(|e: strum::ParseError| sqlx::Error::Decode(Box::new(e)))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
