use thiserror::Error;
use warp::http::StatusCode;
use warp::reject::Reject;

/// Error taxonomy surfaced to API callers. Every variant maps to one HTTP
/// status; `Database` and `Internal` are logged and reported with a generic
/// body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message for the response body. Server-side failures get a generic
    /// detail; the real cause stays in the logs.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Database(_) | ApiError::Internal(_) => {
                String::from("internal server error")
            }
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(value: sqlx::Error) -> Self {
        match &value {
            sqlx::Error::RowNotFound => {
                ApiError::NotFound(String::from("requested row does not exist"))
            }
            sqlx::Error::Database(e) if e.is_unique_violation() => {
                ApiError::Conflict(String::from("resource already exists"))
            }
            sqlx::Error::Database(e) if e.is_foreign_key_violation() => {
                ApiError::Validation(String::from("referenced resource does not exist"))
            }
            _ => ApiError::Database(value),
        }
    }
}

/* warp's blanket From<T: Reject> impl turns these into rejections via `?` */
impl Reject for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::Validation(String::from("x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict(String::from("x")).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::NotFound(String::from("x")).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn database_errors_hide_their_cause() {
        let err = ApiError::Database(sqlx::Error::PoolClosed);
        assert_eq!(err.detail(), "internal server error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn rejections_carry_the_error() {
        let rejection: warp::reject::Rejection =
            ApiError::Conflict(String::from("taken")).into();
        let found = rejection.find::<ApiError>().unwrap();
        assert_eq!(found.status(), StatusCode::CONFLICT);
        assert_eq!(found.detail(), "taken");
    }
}
