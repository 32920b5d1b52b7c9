use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::permissions::ActionType;
use crate::constants::SESSION_TTL_HOURS;
use crate::error::ApiError;
use crate::schema::{User, UserRole};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSessionData {
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
    iat: i64,
    exp: i64,
}

impl JwtSessionData {
    pub fn new(user: &User) -> Self {
        let now = Utc::now();

        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(SESSION_TTL_HOURS)).timestamp(),
        }
    }
}

/// The authenticated subject, passed explicitly into handlers and actions.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
    pub is_admin: bool,
}

impl SessionData {
    pub fn authorize(&self, action: ActionType) -> Result<(), ApiError> {
        if !action.permits(&self.role) {
            return Err(ApiError::Forbidden(String::from(
                "you do not have permission to perform this action",
            )));
        }
        Ok(())
    }
}

impl From<JwtSessionData> for SessionData {
    fn from(claims: JwtSessionData) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            is_admin: claims.role == UserRole::Admin,
            role: claims.role,
        }
    }
}

fn signing_key(secret: &[u8]) -> Result<Hmac<Sha256>, ApiError> {
    Hmac::new_from_slice(secret)
        .map_err(|_| ApiError::Internal(String::from("invalid JWT signing key")))
}

pub fn generate_jwt_session(user: &User, secret: &[u8]) -> Result<String, ApiError> {
    let key = signing_key(secret)?;
    let claims = JwtSessionData::new(user);

    claims
        .sign_with_key(&key)
        .map_err(|e| ApiError::Internal(format!("failed to sign session token: {e}")))
}

pub fn verify_jwt_session(token: &str, secret: &[u8]) -> Result<JwtSessionData, ApiError> {
    let key = signing_key(secret)?;

    let session: JwtSessionData = token
        .verify_with_key(&key)
        .map_err(|_| ApiError::Unauthorized(String::from("invalid session token")))?;

    if session.exp <= Utc::now().timestamp() {
        return Err(ApiError::Unauthorized(String::from("session token expired")));
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    fn user() -> User {
        User {
            id: 7,
            email: String::from("cook@example.com"),
            username: String::from("cook"),
            first_name: String::from("Anna"),
            last_name: String::from("Smith"),
            password: String::from("<hash>"),
            role: UserRole::User,
        }
    }

    #[test]
    fn sign_then_verify_round_trip() {
        let token = generate_jwt_session(&user(), SECRET).unwrap();
        let claims = verify_jwt_session(&token, SECRET).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "cook");
        assert_eq!(claims.role, UserRole::User);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_jwt_session(&user(), SECRET).unwrap();
        assert!(verify_jwt_session(&token, b"other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let key: Hmac<Sha256> = Hmac::new_from_slice(SECRET).unwrap();
        let now = Utc::now();
        let claims = JwtSessionData {
            user_id: 7,
            username: String::from("cook"),
            role: UserRole::User,
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = claims.sign_with_key(&key).unwrap();
        assert!(matches!(
            verify_jwt_session(&token, SECRET),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn admin_flag_follows_role() {
        let mut u = user();
        u.role = UserRole::Admin;
        let session: SessionData = JwtSessionData::new(&u).into();
        assert!(session.is_admin);
    }
}
