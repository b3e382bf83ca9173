use std::collections::BTreeMap;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Field name → human readable message.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "{}", _0)]
    PreconditionFailed(String),

    #[display(fmt = "Validation Error")]
    Validation(FieldErrors),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "Internal Server Error")]
    Database(sqlx::Error),
}

impl AppError {
    /// Stable discriminant sent to clients alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Conflict(_) => "conflict",
            AppError::PreconditionFailed(_) => "precondition_failed",
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Database(_) => "internal",
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.into());
        AppError::Validation(errors)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PreconditionFailed(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Database(e) = self {
            tracing::error!(error = %e, "Database error");
        }

        let mut body = json!({
            "success": false,
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let AppError::Validation(errors) = self {
            body["errors"] = json!(errors);
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}
