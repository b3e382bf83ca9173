use actix_web::{HttpResponse, http::StatusCode, web};
use serde::Deserialize;
use utoipa::IntoParams;

use super::respond;
use crate::attendance::mysql_store::SessionFilter;
use crate::attendance::{AttendanceEngine, MySqlSessionStore};
use crate::auth::auth::AuthUser;
use crate::error::{AppError, FieldErrors};
use crate::model::attendance::{DateRange, WorkMode};
use crate::utils::date_filter::parse_period;
use crate::utils::pagination::{Paginated, Pagination};
use crate::utils::validation::{Validate, finish};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminAttendanceQuery {
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Items per page, at most 100
    pub limit: Option<i64>,
    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`
    #[param(example = "2026-01")]
    pub date: Option<String>,
    pub employee_id: Option<u64>,
    #[param(inline)]
    pub work_mode: Option<WorkMode>,
}

impl AdminAttendanceQuery {
    fn range(&self) -> DateRange {
        self.date
            .as_deref()
            .and_then(parse_period)
            .unwrap_or_default()
    }
}

impl Validate for AdminAttendanceQuery {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(raw) = self.date.as_deref() {
            if parse_period(raw).is_none() {
                errors.insert(
                    "date".into(),
                    "Date must be YYYY, YYYY-MM or YYYY-MM-DD".into(),
                );
            }
        }
        finish(errors)
    }
}

/// All employees' sessions, newest first
#[utoipa::path(
    get,
    path = "/api/admin/attendance",
    params(AdminAttendanceQuery),
    responses(
        (status = 200, description = "Paginated sessions", body = SessionPage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Invalid date filter")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance Admin"
)]
pub async fn list_sessions(
    auth: AuthUser,
    engine: web::Data<AttendanceEngine<MySqlSessionStore>>,
    query: web::Query<AdminAttendanceQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;
    query.validated()?;

    let filter = SessionFilter {
        employee_id: query.employee_id,
        work_mode: query.work_mode,
        range: query.range(),
    };
    let page = Pagination::sanitize(query.page, query.limit);

    let (sessions, total) = engine.store().list_all(&filter, page).await?;

    Ok(respond(
        StatusCode::OK,
        "Attendance sessions",
        Paginated::new(sessions, total, page),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Session id")
    ),
    responses(
        (status = 200, description = "Session found", body = AttendanceSession),
        (status = 404, description = "Session not found", body = Object, example = json!({
            "success": false,
            "error": "not_found",
            "message": "Attendance session not found"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance Admin"
)]
pub async fn get_session(
    auth: AuthUser,
    engine: web::Data<AttendanceEngine<MySqlSessionStore>>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();

    let session = engine
        .store()
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendance session not found".into()))?;

    Ok(respond(StatusCode::OK, "Attendance session", session))
}
