use actix_web::{HttpResponse, http::StatusCode, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use super::respond;
use crate::auth::auth::AuthUser;
use crate::error::{AppError, FieldErrors};
use crate::model::attendance::GeoPoint;
use crate::model::attendance_request::{
    AttendanceRequest, AttendanceRequestRow, RequestStatus, RequestType,
};
use crate::utils::pagination::{Paginated, Pagination};
use crate::utils::validation::{Validate, finish};

const REQUEST_COLUMNS: &str = "id, employee_id, request_type, description, start_date, end_date, \
     latitude, longitude, status, created_at, updated_at";

const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAttendanceRequest {
    #[schema(example = "sick")]
    pub request_type: RequestType,
    #[schema(example = "Flu, doctor's note attached")]
    pub description: String,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-06", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    /// Where the request was filed from, if the client shares it
    #[schema(example = json!(-6.2), nullable = true)]
    pub latitude: Option<f64>,
    #[schema(example = 106.816666, nullable = true)]
    pub longitude: Option<f64>,
}

impl Validate for CreateAttendanceRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let len = self.description.trim().chars().count();
        if len == 0 {
            errors.insert("description".into(), "Description is required".into());
        } else if len > MAX_DESCRIPTION_LEN {
            errors.insert(
                "description".into(),
                format!("Description must be at most {MAX_DESCRIPTION_LEN} characters"),
            );
        }

        if self.start_date > self.end_date {
            errors.insert(
                "start_date".into(),
                "start_date cannot be after end_date".into(),
            );
        }

        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => GeoPoint::new(lat, lon).check_into(&mut errors),
            (None, None) => {}
            _ => {
                errors.insert(
                    "latitude".into(),
                    "Latitude and longitude must be given together".into(),
                );
            }
        }

        finish(errors)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRequestStatus {
    #[schema(example = 4)]
    pub id: u64,
    #[schema(example = "approved")]
    pub status: RequestStatus,
}

impl Validate for UpdateRequestStatus {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.status == RequestStatus::Pending {
            errors.insert(
                "status".into(),
                "Status must be approved, rejected or cancelled".into(),
            );
        }
        finish(errors)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MyRequestsQuery {
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Items per page, at most 100
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestListQuery {
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Items per page, at most 100
    pub limit: Option<i64>,
    /// Only requests of this employee
    pub employee_id: Option<u64>,
}

async fn fetch_page(
    pool: &MySqlPool,
    employee_id: Option<u64>,
    order_by: &str,
    page: Pagination,
) -> Result<Paginated<AttendanceRequest>, sqlx::Error> {
    let where_sql = if employee_id.is_some() {
        " WHERE employee_id = ?"
    } else {
        ""
    };

    let count_sql = format!("SELECT COUNT(*) FROM attendance_requests{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(id) = employee_id {
        count_q = count_q.bind(id);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {REQUEST_COLUMNS} FROM attendance_requests{where_sql} \
         ORDER BY {order_by} LIMIT ? OFFSET ?"
    );
    let mut data_q = sqlx::query_as::<_, AttendanceRequestRow>(&data_sql);
    if let Some(id) = employee_id {
        data_q = data_q.bind(id);
    }
    let rows = data_q
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    let data = rows
        .into_iter()
        .map(AttendanceRequest::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Paginated::new(data, total, page))
}

async fn find_request(pool: &MySqlPool, id: u64) -> Result<Option<AttendanceRequest>, sqlx::Error> {
    let sql = format!("SELECT {REQUEST_COLUMNS} FROM attendance_requests WHERE id = ?");
    sqlx::query_as::<_, AttendanceRequestRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(AttendanceRequest::try_from)
        .transpose()
}

/* =========================
Employee side
========================= */
#[utoipa::path(
    post,
    path = "/api/app/attendance/request",
    request_body = CreateAttendanceRequest,
    responses(
        (status = 201, description = "Attendance request submitted", body = AttendanceRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Invalid request body")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance Requests"
)]
pub async fn create_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<CreateAttendanceRequest>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    body.validated()?;

    let result = sqlx::query(
        r#"
        INSERT INTO attendance_requests
            (employee_id, request_type, description, start_date, end_date, latitude, longitude)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(body.request_type.as_str())
    .bind(body.description.trim())
    .bind(body.start_date)
    .bind(body.end_date)
    .bind(body.latitude)
    .bind(body.longitude)
    .execute(pool.get_ref())
    .await?;

    let request = find_request(pool.get_ref(), result.last_insert_id())
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;

    tracing::info!(
        request_id = request.id,
        employee_id,
        request_type = request.request_type.as_str(),
        "Attendance request submitted"
    );

    Ok(respond(
        StatusCode::CREATED,
        "Attendance request submitted",
        request,
    ))
}

#[utoipa::path(
    get,
    path = "/api/app/attendance/request",
    params(MyRequestsQuery),
    responses(
        (status = 200, description = "The caller's attendance requests", body = AttendanceRequestPage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance Requests"
)]
pub async fn my_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MyRequestsQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let page = Pagination::sanitize(query.page, query.limit);

    let requests = fetch_page(
        pool.get_ref(),
        Some(employee_id),
        "start_date DESC, id DESC",
        page,
    )
    .await?;

    Ok(respond(StatusCode::OK, "Attendance requests", requests))
}

/* =========================
Admin side
========================= */
#[utoipa::path(
    get,
    path = "/api/admin/attendance-requests",
    params(RequestListQuery),
    responses(
        (status = 200, description = "All attendance requests", body = AttendanceRequestPage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance Requests"
)]
pub async fn list_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RequestListQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;
    let page = Pagination::sanitize(query.page, query.limit);

    let requests = fetch_page(
        pool.get_ref(),
        query.employee_id,
        "created_at DESC, id DESC",
        page,
    )
    .await?;

    Ok(respond(StatusCode::OK, "Attendance requests", requests))
}

#[utoipa::path(
    put,
    path = "/api/admin/attendance-requests/status",
    request_body = UpdateRequestStatus,
    responses(
        (status = 200, description = "Status updated", body = AttendanceRequest),
        (status = 404, description = "Attendance request not found", body = Object, example = json!({
            "success": false,
            "error": "not_found",
            "message": "Attendance request not found"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Invalid status")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance Requests"
)]
pub async fn update_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<UpdateRequestStatus>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;
    body.validated()?;

    // MySQL reports zero affected rows when the status is unchanged, so look
    // the row up instead of trusting rows_affected for the 404.
    if find_request(pool.get_ref(), body.id).await?.is_none() {
        return Err(AppError::NotFound("Attendance request not found".into()));
    }

    sqlx::query(
        r#"
        UPDATE attendance_requests
        SET status = ?, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(body.status.as_str())
    .bind(body.id)
    .execute(pool.get_ref())
    .await?;

    let request = find_request(pool.get_ref(), body.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendance request not found".into()))?;

    tracing::info!(
        request_id = request.id,
        status = request.status.as_str(),
        approver = auth.user_id,
        "Attendance request status changed"
    );

    Ok(respond(StatusCode::OK, "Status updated", request))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateAttendanceRequest {
        CreateAttendanceRequest {
            request_type: RequestType::Sick,
            description: "Flu".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn accepts_a_plain_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn rejects_blank_and_oversized_descriptions() {
        let mut r = request();
        r.description = "   ".into();
        assert!(r.validate().unwrap_err().contains_key("description"));

        r.description = "a".repeat(MAX_DESCRIPTION_LEN + 1);
        assert!(r.validate().unwrap_err().contains_key("description"));

        r.description = "a".repeat(MAX_DESCRIPTION_LEN);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_dates() {
        let mut r = request();
        r.start_date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let errors = r.validate().unwrap_err();
        assert_eq!(errors["start_date"], "start_date cannot be after end_date");
    }

    #[test]
    fn coordinates_are_checked_as_a_pair() {
        let mut r = request();
        r.latitude = Some(10.0);
        assert!(r.validate().unwrap_err().contains_key("latitude"));

        r.longitude = Some(200.0);
        assert_eq!(
            r.validate().unwrap_err()["longitude"],
            "Longitude must be <= 180"
        );

        r.longitude = Some(20.0);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn status_update_cannot_reset_to_pending() {
        let update = UpdateRequestStatus {
            id: 1,
            status: RequestStatus::Pending,
        };
        assert!(update.validate().is_err());

        let update = UpdateRequestStatus {
            id: 1,
            status: RequestStatus::Cancelled,
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn status_body_parses_lowercase() {
        let update: UpdateRequestStatus =
            serde_json::from_str(r#"{ "id": 3, "status": "rejected" }"#).unwrap();
        assert_eq!(update.status, RequestStatus::Rejected);
    }
}
