use actix_web::{HttpResponse, http::StatusCode, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use super::respond;
use crate::auth::auth::AuthUser;
use crate::error::{AppError, FieldErrors};
use crate::model::attendance::GeoPoint;
use crate::model::office_location::OfficeLocation;
use crate::utils::office_cache::OfficeCache;
use crate::utils::pagination::{Paginated, Pagination};
use crate::utils::validation::{Validate, finish};

const OFFICE_COLUMNS: &str = "id, name, latitude, longitude, radius_meters, created_at";

#[derive(Debug, Deserialize, ToSchema)]
pub struct OfficeLocationPayload {
    #[schema(example = "Head Office")]
    pub name: String,
    #[schema(example = json!(-6.2))]
    pub latitude: f64,
    #[schema(example = 106.816666)]
    pub longitude: f64,
    /// Geofence radius in meters
    #[schema(example = 150.0)]
    pub radius_meters: f64,
}

impl Validate for OfficeLocationPayload {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let len = self.name.trim().chars().count();
        if !(3..=100).contains(&len) {
            errors.insert(
                "name".into(),
                "Name must be between 3 and 100 characters".into(),
            );
        }

        GeoPoint::new(self.latitude, self.longitude).check_into(&mut errors);

        if !self.radius_meters.is_finite() {
            errors.insert("radius_meters".into(), "Radius must be a number".into());
        } else if self.radius_meters < 0.0 {
            errors.insert("radius_meters".into(), "Radius must be >= 0".into());
        }

        finish(errors)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OfficeListQuery {
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Items per page, at most 100
    pub limit: Option<i64>,
}

async fn find_office(pool: &MySqlPool, id: u64) -> Result<Option<OfficeLocation>, sqlx::Error> {
    let sql = format!("SELECT {OFFICE_COLUMNS} FROM office_locations WHERE id = ?");
    sqlx::query_as::<_, OfficeLocation>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

fn not_found() -> AppError {
    AppError::NotFound("Office location not found".into())
}

#[utoipa::path(
    get,
    path = "/api/admin/office-locations",
    params(OfficeListQuery),
    responses(
        (status = 200, description = "Paginated office locations", body = OfficeLocationPage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Office Locations"
)]
pub async fn list_offices(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<OfficeListQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;
    let page = Pagination::sanitize(query.page, query.limit);

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM office_locations")
        .fetch_one(pool.get_ref())
        .await?;

    let sql = format!(
        "SELECT {OFFICE_COLUMNS} FROM office_locations \
         ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
    );
    let offices = sqlx::query_as::<_, OfficeLocation>(&sql)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool.get_ref())
        .await?;

    Ok(respond(
        StatusCode::OK,
        "Office locations",
        Paginated::new(offices, total, page),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/office-locations",
    request_body = OfficeLocationPayload,
    responses(
        (status = 201, description = "Office location created", body = OfficeLocation),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Invalid office location")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Office Locations"
)]
pub async fn create_office(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<OfficeCache>,
    body: web::Json<OfficeLocationPayload>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;
    body.validated()?;

    let result = sqlx::query(
        r#"
        INSERT INTO office_locations (name, latitude, longitude, radius_meters)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(body.name.trim())
    .bind(body.latitude)
    .bind(body.longitude)
    .bind(body.radius_meters)
    .execute(pool.get_ref())
    .await?;

    cache.invalidate().await;

    let office = find_office(pool.get_ref(), result.last_insert_id())
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;

    tracing::info!(office_id = office.id, by = auth.user_id, "Office location created");

    Ok(respond(StatusCode::CREATED, "Office location created", office))
}

#[utoipa::path(
    put,
    path = "/api/admin/office-locations/{id}",
    params(
        ("id" = u64, Path, description = "Office location id")
    ),
    request_body = OfficeLocationPayload,
    responses(
        (status = 200, description = "Office location updated", body = OfficeLocation),
        (status = 404, description = "Office location not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Invalid office location")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Office Locations"
)]
pub async fn update_office(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<OfficeCache>,
    path: web::Path<u64>,
    body: web::Json<OfficeLocationPayload>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;
    body.validated()?;
    let id = path.into_inner();

    if find_office(pool.get_ref(), id).await?.is_none() {
        return Err(not_found());
    }

    sqlx::query(
        r#"
        UPDATE office_locations
        SET name = ?, latitude = ?, longitude = ?, radius_meters = ?
        WHERE id = ?
        "#,
    )
    .bind(body.name.trim())
    .bind(body.latitude)
    .bind(body.longitude)
    .bind(body.radius_meters)
    .bind(id)
    .execute(pool.get_ref())
    .await?;

    cache.invalidate().await;

    let office = find_office(pool.get_ref(), id).await?.ok_or_else(not_found)?;
    tracing::info!(office_id = id, by = auth.user_id, "Office location updated");

    Ok(respond(StatusCode::OK, "Office location updated", office))
}

#[utoipa::path(
    delete,
    path = "/api/admin/office-locations/{id}",
    params(
        ("id" = u64, Path, description = "Office location id")
    ),
    responses(
        (status = 200, description = "Office location deleted", body = OfficeLocation),
        (status = 404, description = "Office location not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Office Locations"
)]
pub async fn delete_office(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<OfficeCache>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();

    let office = find_office(pool.get_ref(), id).await?.ok_or_else(not_found)?;

    let result = sqlx::query("DELETE FROM office_locations WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }

    cache.invalidate().await;
    tracing::info!(office_id = id, by = auth.user_id, "Office location deleted");

    Ok(respond(StatusCode::OK, "Office location deleted", office))
}
