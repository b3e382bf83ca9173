use crate::auth::auth::AuthUser;
use crate::auth::jwt::{TokenType, verify_token};
use crate::config::Config;
use crate::error::AppError;
use crate::model::role::Role;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};

fn reject(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    tracing::debug!(path = %req.path(), reason = message, "Rejected request");
    let resp = AppError::Unauthorized(message.to_string()).error_response();
    req.into_response(resp)
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let Some(config) = req.app_data::<Data<Config>>().cloned() else {
        return Err(actix_web::error::ErrorInternalServerError("App config missing"));
    };

    let header_value = match req.headers().get("Authorization").map(|h| h.to_str()) {
        Some(Ok(h)) => h.to_string(),
        Some(Err(_)) => return Ok(reject(req, "Invalid Authorization header encoding")),
        None => return Ok(reject(req, "Missing Authorization header")),
    };

    let Some(token) = header_value.strip_prefix("Bearer ") else {
        return Ok(reject(req, "Authorization header must start with Bearer"));
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return Ok(reject(req, "Invalid or expired token")),
    };

    if claims.token_type != TokenType::Access {
        return Ok(reject(req, "Access token required"));
    }

    let Some(role) = Role::from_claim(claims.role) else {
        return Ok(reject(req, "Invalid role"));
    };

    let auth_user = AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
        employee_id: claims.employee_id,
    };

    tracing::debug!(
        user = %auth_user.username,
        role = auth_user.role.as_str(),
        path = %req.path(),
        "Authenticated request"
    );
    req.extensions_mut().insert(auth_user);

    next.call(req).await
}
