use crate::error::AppError;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

/// Caller identity placed in request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| AppError::Unauthorized("Missing token".to_string())),
        )
    }
}

impl AuthUser {
    pub fn require_hr_or_admin(&self) -> Result<(), AppError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden("HR/Admin only".to_string()))
        }
    }

    /// The caller's employee id; attendance endpoints act on it alone.
    pub fn require_employee(&self) -> Result<u64, AppError> {
        self.employee_id
            .ok_or_else(|| AppError::Forbidden("No employee profile".to_string()))
    }
}
