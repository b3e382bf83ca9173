use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Claims of tokens minted by the identity service. This service only
/// verifies them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
    /// Set when the user is linked to an employee record
    #[serde(default)]
    pub employee_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

/// Mints tokens the way the identity service does, for handler tests.
#[cfg(test)]
pub fn generate_access_token(
    user_id: u64,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        user_id,
        sub: format!("user-{user_id}"),
        role,
        exp: now + 900,
        jti: format!("test-{user_id}-{now}"),
        token_type: TokenType::Access,
        employee_id,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_claims() {
        let token = generate_access_token(5, 3, Some(77), "s3cret");
        let claims = verify_token(&token, "s3cret").unwrap();
        assert_eq!(claims.user_id, 5);
        assert_eq!(claims.employee_id, Some(77));
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = generate_access_token(5, 3, Some(77), "s3cret");
        assert!(verify_token(&token, "other").is_err());
    }
}
