use serde_json::json;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::reply::Reply;

use crate::api::context::ApiContext;
use crate::database::actions::users;
use crate::form::LoginForm;
use crate::jwt::SessionData;

pub async fn login(ctx: ApiContext, form: LoginForm) -> Result<impl Reply, Rejection> {
    form.validate()?;

    let token = users::login_user(
        &form.email,
        &form.password,
        ctx.jwt_secret.as_bytes(),
        &ctx.pool,
    )
    .await?;

    Ok(warp::reply::json(&json!({ "auth_token": token })))
}

/// Tokens are stateless, so logout only confirms the caller held a valid
/// one. Clients drop the token themselves.
pub async fn logout(_session: SessionData) -> Result<impl Reply, Rejection> {
    Ok(StatusCode::NO_CONTENT)
}
