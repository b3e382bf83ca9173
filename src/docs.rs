use crate::api::attendance::ClockRequest;
use crate::api::attendance_request::{CreateAttendanceRequest, UpdateRequestStatus};
use crate::api::office_location::OfficeLocationPayload;
use crate::model::attendance::{
    AttendanceSession, AttendanceStatus, GeoPoint, NextAction, StatusView, WorkMode,
};
use crate::model::attendance_request::{AttendanceRequest, RequestStatus, RequestType};
use crate::model::office_location::OfficeLocation;
use crate::utils::pagination::{
    AttendanceRequestPage, OfficeLocationPage, PageMeta, SessionPage,
};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance API",
        version = "1.0.0",
        description = r#"
## Employee Attendance

Clock-in / clock-out with geofence based work-mode detection.

### Key Features
- **Attendance sessions**
  - One open session per employee at a time
  - Work mode (`onsite` / `remote`) fixed at clock-in from the configured office geofences
  - Status and paginated history for the caller
- **Attendance requests**
  - Employees file leave/sick requests, HR/Admin approve or reject them
- **Office locations**
  - HR/Admin manage the geofences used at clock-in

### Security
Every endpoint expects an access token: `Authorization: Bearer <jwt>`.
`/app/*` endpoints need a token linked to an employee, `/admin/*` endpoints need the HR or Admin role.

### Response Format
- Success: `{ "success": true, "message": ..., "data": ... }`
- Error: `{ "success": false, "error": <kind>, "message": ..., "errors"?: { field: message } }`
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::status,
        crate::api::attendance::history,

        crate::api::attendance_request::create_request,
        crate::api::attendance_request::my_requests,
        crate::api::attendance_request::list_requests,
        crate::api::attendance_request::update_status,

        crate::api::admin_attendance::list_sessions,
        crate::api::admin_attendance::get_session,

        crate::api::office_location::list_offices,
        crate::api::office_location::create_office,
        crate::api::office_location::update_office,
        crate::api::office_location::delete_office
    ),
    components(
        schemas(
            ClockRequest,
            GeoPoint,
            WorkMode,
            AttendanceSession,
            AttendanceStatus,
            NextAction,
            StatusView,
            CreateAttendanceRequest,
            UpdateRequestStatus,
            AttendanceRequest,
            RequestType,
            RequestStatus,
            OfficeLocation,
            OfficeLocationPayload,
            PageMeta,
            SessionPage,
            OfficeLocationPage,
            AttendanceRequestPage
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Clock-in, clock-out, status and history"),
        (name = "Attendance Requests", description = "Leave and sick requests"),
        (name = "Attendance Admin", description = "Read-only session browsing for HR/Admin"),
        (name = "Office Locations", description = "Office geofence management"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
