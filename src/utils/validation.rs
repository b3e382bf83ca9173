use actix_web::{HttpRequest, ResponseError, error::InternalError, web};

use crate::error::{AppError, FieldErrors};

/// Request payloads that check themselves before reaching the engine.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;

    fn validated(&self) -> Result<(), AppError> {
        self.validate().map_err(AppError::Validation)
    }
}

pub fn finish(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Malformed JSON bodies become 422 responses in the common error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        let response = AppError::validation("body", err.to_string()).error_response();
        InternalError::from_response(err, response).into()
    })
}

/// Malformed query strings become 422 responses in the common error shape.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        let response = AppError::validation("query", err.to_string()).error_response();
        InternalError::from_response(err, response).into()
    })
}
