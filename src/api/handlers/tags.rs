use warp::reject::Rejection;
use warp::reply::Reply;

use crate::api::context::ApiContext;
use crate::database::actions::tags;
use crate::error::ApiError;

pub async fn list(ctx: ApiContext) -> Result<impl Reply, Rejection> {
    let tags = tags::list_tags(&ctx.pool).await?;

    Ok(warp::reply::json(&tags))
}

pub async fn detail(id: i32, ctx: ApiContext) -> Result<impl Reply, Rejection> {
    let tag = tags::get_tag(id, &ctx.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("tag does not exist")))?;

    Ok(warp::reply::json(&tag))
}
