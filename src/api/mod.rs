pub mod admin_attendance;
pub mod attendance;
pub mod attendance_request;
pub mod office_location;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use serde_json::json;

/// `{ success, message, data }` envelope shared by every handler.
pub fn respond<T: Serialize>(status: StatusCode, message: &str, data: T) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "success": true,
        "message": message,
        "data": data,
    }))
}
