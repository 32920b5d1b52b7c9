use serde_json::json;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::reply::Reply;

use crate::api::context::ApiContext;
use crate::database::actions::{relations, users};
use crate::database::actions::relations::Relation;
use crate::error::ApiError;
use crate::form::{RegisterForm, SetPasswordForm};
use crate::jwt::SessionData;
use crate::pagination::PageParams;

pub async fn register(ctx: ApiContext, form: RegisterForm) -> Result<impl Reply, Rejection> {
    form.validate()?;

    let user = users::register_user(&form, &ctx.pool).await?;

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({
            "email": user.email,
            "id": user.id,
            "username": user.username,
            "first_name": user.first_name,
            "last_name": user.last_name,
        })),
        StatusCode::CREATED,
    ))
}

pub async fn list(
    session: SessionData,
    params: PageParams,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    let page = users::fetch_users(Some(session.user_id), &params, &ctx.pool).await?;

    Ok(warp::reply::json(&page))
}

pub async fn me(session: SessionData, ctx: ApiContext) -> Result<impl Reply, Rejection> {
    let view = users::get_user_view(session.user_id, Some(session.user_id), &ctx.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("user does not exist")))?;

    Ok(warp::reply::json(&view))
}

pub async fn profile(
    id: i32,
    session: SessionData,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    let view = users::get_user_view(id, Some(session.user_id), &ctx.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("user does not exist")))?;

    Ok(warp::reply::json(&view))
}

pub async fn set_password(
    session: SessionData,
    ctx: ApiContext,
    form: SetPasswordForm,
) -> Result<impl Reply, Rejection> {
    form.validate()?;

    users::set_password(
        session.user_id,
        &form.current_password,
        &form.new_password,
        &ctx.pool,
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn subscriptions(
    session: SessionData,
    params: PageParams,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    let page = users::fetch_subscriptions(session.user_id, &params, &ctx.pool).await?;

    Ok(warp::reply::json(&page))
}

pub async fn subscribe(
    author_id: i32,
    session: SessionData,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    if users::get_user_by_id(author_id, &ctx.pool).await?.is_none() {
        return Err(ApiError::NotFound(String::from("author does not exist")).into());
    }

    relations::add_relation(Relation::Subscription, session.user_id, author_id, &ctx.pool).await?;
    let view = users::get_subscription_view(author_id, session.user_id, &ctx.pool).await?;

    Ok(warp::reply::with_status(
        warp::reply::json(&view),
        StatusCode::CREATED,
    ))
}

pub async fn unsubscribe(
    author_id: i32,
    session: SessionData,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    relations::remove_relation(Relation::Subscription, session.user_id, author_id, &ctx.pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
