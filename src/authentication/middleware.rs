use warp::{reject::Rejection, Filter};

use super::jwt::{verify_jwt_session, SessionData};
use crate::error::ApiError;

/// Parses `Authorization: Token <jwt>` (Bearer is accepted too) into a
/// session.
fn session_from_header(header: &str, secret: &[u8]) -> Result<SessionData, ApiError> {
    let token = header
        .strip_prefix("Token ")
        .or_else(|| header.strip_prefix("Bearer "))
        .ok_or_else(|| {
            ApiError::Unauthorized(String::from("malformed authorization header"))
        })?;

    verify_jwt_session(token.trim(), secret).map(SessionData::from)
}

/// Requires a valid session; missing or invalid credentials reject with 401.
pub fn with_session(
    secret: String,
) -> impl Filter<Extract = (SessionData,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let secret = secret.clone();
        async move {
            match header {
                Some(header) => session_from_header(&header, secret.as_bytes())
                    .map_err(warp::reject::custom),
                None => Err(warp::reject::custom(ApiError::Unauthorized(String::from(
                    "authentication credentials were not provided",
                )))),
            }
        }
    })
}

/// Yields `Some(session)` for valid credentials and `None` otherwise, never
/// rejecting. Read endpoints use this to compute viewer flags for anonymous
/// requesters.
pub fn with_possible_session(
    secret: String,
) -> impl Filter<Extract = (Option<SessionData>,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").map(move |header: Option<String>| {
        header.and_then(|header| session_from_header(&header, secret.as_bytes()).ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::generate_jwt_session;
    use crate::schema::{User, UserRole};

    fn user() -> User {
        User {
            id: 3,
            email: String::from("a@b.com"),
            username: String::from("a"),
            first_name: String::from("A"),
            last_name: String::from("B"),
            password: String::from("<hash>"),
            role: UserRole::User,
        }
    }

    #[test]
    fn accepts_token_and_bearer_schemes() {
        let token = generate_jwt_session(&user(), b"s").unwrap();
        assert!(session_from_header(&format!("Token {token}"), b"s").is_ok());
        assert!(session_from_header(&format!("Bearer {token}"), b"s").is_ok());
    }

    #[test]
    fn rejects_unknown_scheme() {
        let token = generate_jwt_session(&user(), b"s").unwrap();
        assert!(session_from_header(&format!("Basic {token}"), b"s").is_err());
        assert!(session_from_header(&token, b"s").is_err());
    }

    #[tokio::test]
    async fn possible_session_never_rejects() {
        let filter = with_possible_session(String::from("s"));

        let anonymous = warp::test::request().filter(&filter).await.unwrap();
        assert!(anonymous.is_none());

        let garbage = warp::test::request()
            .header("authorization", "Token not-a-jwt")
            .filter(&filter)
            .await
            .unwrap();
        assert!(garbage.is_none());

        let token = generate_jwt_session(&user(), b"s").unwrap();
        let session = warp::test::request()
            .header("authorization", format!("Token {token}"))
            .filter(&filter)
            .await
            .unwrap();
        assert_eq!(session.map(|s| s.user_id), Some(3));
    }
}
