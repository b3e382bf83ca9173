use actix_web::{HttpResponse, http::StatusCode, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::respond;
use crate::attendance::AttendanceEngine;
use crate::attendance::store::SessionStore;
use crate::auth::auth::AuthUser;
use crate::error::{AppError, FieldErrors};
use crate::model::attendance::{DateRange, GeoPoint};
use crate::utils::pagination::Pagination;
use crate::utils::validation::{Validate, finish};

const MAX_PHOTO_URL_LEN: usize = 2048;

/// Body of clock-in and clock-out.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClockRequest {
    #[schema(example = json!(-6.2))]
    pub latitude: f64,
    #[schema(example = 106.816666)]
    pub longitude: f64,
    /// Reference returned by the photo upload service
    #[schema(example = "https://storage.example.com/attendance/42/in.jpg", nullable = true)]
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl ClockRequest {
    fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

impl Validate for ClockRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        self.point().check_into(&mut errors);

        if let Some(url) = &self.photo_url {
            if url.trim().is_empty() {
                errors.insert("photo_url".into(), "Photo URL must not be empty".into());
            } else if url.len() > MAX_PHOTO_URL_LEN {
                errors.insert(
                    "photo_url".into(),
                    format!("Photo URL must be at most {MAX_PHOTO_URL_LEN} characters"),
                );
            }
        }
        finish(errors)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Items per page, at most 100
    pub limit: Option<i64>,
    /// Earliest work date, inclusive (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// Latest work date, inclusive (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

impl Validate for HistoryQuery {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                errors.insert(
                    "start_date".into(),
                    "start_date cannot be after end_date".into(),
                );
            }
        }
        finish(errors)
    }
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/app/attendance/start",
    request_body = ClockRequest,
    responses(
        (status = 201, description = "Clock-in successful", body = AttendanceSession),
        (status = 409, description = "Employee already has an open session", body = Object, example = json!({
            "success": false,
            "error": "conflict",
            "message": "You already have an active session. Please clock-out first."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Invalid coordinates"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_in<S: SessionStore + 'static>(
    auth: AuthUser,
    engine: web::Data<AttendanceEngine<S>>,
    body: web::Json<ClockRequest>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    body.validated()?;

    let body = body.into_inner();
    let session = engine
        .clock_in(employee_id, body.point(), body.photo_url)
        .await?;

    Ok(respond(StatusCode::CREATED, "Clock-in successful", session))
}

/// Clock-out endpoint
#[utoipa::path(
    post,
    path = "/api/app/attendance/end",
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Clock-out successful", body = AttendanceSession),
        (status = 400, description = "No open session to close", body = Object, example = json!({
            "success": false,
            "error": "precondition_failed",
            "message": "No active session found. Please clock-in first."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Invalid coordinates"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_out<S: SessionStore + 'static>(
    auth: AuthUser,
    engine: web::Data<AttendanceEngine<S>>,
    body: web::Json<ClockRequest>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    body.validated()?;

    let body = body.into_inner();
    let session = engine
        .clock_out(employee_id, body.point(), body.photo_url)
        .await?;

    Ok(respond(StatusCode::OK, "Clock-out successful", session))
}

/// Current attendance status of the caller
#[utoipa::path(
    get,
    path = "/api/app/attendance/status",
    responses(
        (status = 200, description = "Status derived from the latest session", body = StatusView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn status<S: SessionStore + 'static>(
    auth: AuthUser,
    engine: web::Data<AttendanceEngine<S>>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let view = engine.status(employee_id).await?;
    Ok(respond(StatusCode::OK, "Attendance status", view))
}

/// The caller's own sessions, newest first
#[utoipa::path(
    get,
    path = "/api/app/attendance/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Paginated session history", body = SessionPage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Invalid date range")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn history<S: SessionStore + 'static>(
    auth: AuthUser,
    engine: web::Data<AttendanceEngine<S>>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    query.validated()?;

    let range = DateRange {
        start: query.start_date,
        end: query.end_date,
    };
    let page = Pagination::sanitize(query.page, query.limit);
    let history = engine.history(employee_id, range, page).await?;

    Ok(respond(StatusCode::OK, "Attendance history", history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::memory_store::MemoryStore;
    use crate::auth::jwt::generate_access_token;
    use crate::auth::middleware::auth_middleware;
    use crate::config::Config;
    use crate::model::office_location::OfficeLocation;
    use crate::routes::{app_routes, build_limiter};
    use actix_web::middleware::from_fn;
    use actix_web::{App, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    const SECRET: &str = "test-secret";

    fn office() -> OfficeLocation {
        OfficeLocation {
            id: 9,
            name: "Head Office".into(),
            latitude: 1.0,
            longitude: 1.0,
            radius_meters: 100.0,
            created_at: None,
        }
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(Config::for_tests(SECRET)))
                    .app_data(web::Data::new(AttendanceEngine::new(
                        MemoryStore::with_offices(vec![office()]),
                    )))
                    .app_data(crate::utils::validation::json_config())
                    .app_data(crate::utils::validation::query_config())
                    .service(
                        web::scope("/api/app")
                            .wrap(from_fn(auth_middleware))
                            .configure(|cfg| {
                                app_routes::<MemoryStore>(cfg, Arc::new(build_limiter(1000)))
                            }),
                    ),
            )
            .await
        };
    }

    fn employee_token(employee_id: u64) -> String {
        format!(
            "Bearer {}",
            generate_access_token(employee_id + 100, 3, Some(employee_id), SECRET)
        )
    }

    fn post(uri: &str, token: &str, body: Value) -> test::TestRequest {
        test::TestRequest::post()
            .uri(uri)
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .insert_header(("Authorization", token.to_string()))
            .set_json(body)
    }

    fn get(uri: &str, token: &str) -> test::TestRequest {
        test::TestRequest::get()
            .uri(uri)
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .insert_header(("Authorization", token.to_string()))
    }

    #[actix_web::test]
    async fn clock_in_then_out_over_http() {
        let app = app!();
        let token = employee_token(1);

        let resp = test::call_service(
            &app,
            post(
                "/api/app/attendance/start",
                &token,
                json!({ "latitude": 1.0, "longitude": 1.0 }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["work_mode"], "onsite");
        assert_eq!(body["data"]["office_name"], "Head Office");
        assert_eq!(body["data"]["end_time"], Value::Null);

        let req = get("/api/app/attendance/status", &token).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["status"], "clockin");
        assert_eq!(body["data"]["next_action"], "clockout");

        let resp = test::call_service(
            &app,
            post(
                "/api/app/attendance/end",
                &token,
                json!({ "latitude": 10.0, "longitude": 10.0, "photo_url": "out.jpg" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["work_mode"], "onsite");
        assert_eq!(body["data"]["clock_out_photo_ref"], "out.jpg");
        assert!(body["data"]["end_time"].is_string());

        let req = get("/api/app/attendance/status", &token).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["status"], "clockout");
        assert_eq!(body["data"]["next_action"], "clockin");
    }

    #[actix_web::test]
    async fn double_clock_in_is_conflict() {
        let app = app!();
        let token = employee_token(2);
        let body = json!({ "latitude": 10.0, "longitude": 10.0 });

        let first = test::call_service(
            &app,
            post("/api/app/attendance/start", &token, body.clone()).to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = test::call_service(
            &app,
            post("/api/app/attendance/start", &token, body).to_request(),
        )
        .await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(second).await;
        assert_eq!(body["error"], "conflict");
    }

    #[actix_web::test]
    async fn clock_out_without_session_is_rejected() {
        let app = app!();
        let resp = test::call_service(
            &app,
            post(
                "/api/app/attendance/end",
                &employee_token(3),
                json!({ "latitude": 1.0, "longitude": 1.0 }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "precondition_failed");
    }

    #[actix_web::test]
    async fn out_of_range_coordinates_are_422() {
        let app = app!();
        let resp = test::call_service(
            &app,
            post(
                "/api/app/attendance/start",
                &employee_token(4),
                json!({ "latitude": 91.0, "longitude": 1.0 }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"]["latitude"], "Latitude must be <= 90");
    }

    #[actix_web::test]
    async fn missing_latitude_is_422() {
        let app = app!();
        let resp = test::call_service(
            &app,
            post(
                "/api/app/attendance/start",
                &employee_token(4),
                json!({ "longitude": 1.0 }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn missing_token_is_401() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/app/attendance/status")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn token_without_employee_is_403() {
        let app = app!();
        let token = format!("Bearer {}", generate_access_token(1, 1, None, SECRET));
        let resp = test::call_service(&app, get("/api/app/attendance/status", &token).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn history_pages_and_rejects_inverted_range() {
        let app = app!();
        let token = employee_token(5);
        let at = json!({ "latitude": 1.0, "longitude": 1.0 });

        for _ in 0..3 {
            test::call_service(&app, post("/api/app/attendance/start", &token, at.clone()).to_request()).await;
            test::call_service(&app, post("/api/app/attendance/end", &token, at.clone()).to_request()).await;
        }

        let req = get("/api/app/attendance/history?page=1&limit=2", &token).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["pagination"]["total"], 3);
        assert_eq!(body["data"]["pagination"]["limit"], 2);
        assert_eq!(body["data"]["data"].as_array().unwrap().len(), 2);

        let req = get(
            "/api/app/attendance/history?start_date=2026-02-01&end_date=2026-01-01",
            &token,
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = get("/api/app/attendance/history?start_date=yesterday", &token).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
