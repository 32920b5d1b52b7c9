use std::convert::Infallible;

use serde::Serialize;
use warp::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::{InvalidQuery, MethodNotAllowed, MissingHeader, PayloadTooLarge, Rejection};
use warp::reply::Reply;

use crate::error::ApiError;

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

fn reply(status: StatusCode, detail: &str) -> warp::reply::Response {
    warp::reply::with_status(
        warp::reply::json(&ErrorBody {
            detail: detail.to_string(),
        }),
        status,
    )
    .into_response()
}

/// Turns every rejection into the `{"detail": ...}` body the API promises.
/// Server-side errors are logged here and reported with a generic detail.
pub async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Infallible> {
    if rejection.is_not_found() {
        return Ok(reply(StatusCode::NOT_FOUND, "not found"));
    }

    if let Some(error) = rejection.find::<ApiError>() {
        if let ApiError::Database(_) | ApiError::Internal(_) = error {
            log::error!("request failed: {error}");
        }
        return Ok(reply(error.status(), &error.detail()));
    }

    if let Some(error) = rejection.find::<BodyDeserializeError>() {
        return Ok(reply(StatusCode::BAD_REQUEST, &error.to_string()));
    }
    if rejection.find::<PayloadTooLarge>().is_some() {
        return Ok(reply(
            StatusCode::PAYLOAD_TOO_LARGE,
            "request body is too large",
        ));
    }
    if rejection.find::<InvalidQuery>().is_some() {
        return Ok(reply(StatusCode::BAD_REQUEST, "invalid query string"));
    }
    if let Some(error) = rejection.find::<MissingHeader>() {
        return Ok(reply(StatusCode::UNAUTHORIZED, &error.to_string()));
    }
    if rejection.find::<MethodNotAllowed>().is_some() {
        return Ok(reply(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"));
    }

    log::error!("unhandled rejection: {rejection:?}");
    Ok(reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal server error",
    ))
}
