use std::collections::HashMap;

use warp::reject::Rejection;
use warp::reply::Reply;

use crate::api::context::ApiContext;
use crate::database::actions::ingredients;
use crate::error::ApiError;

pub async fn list(
    query: HashMap<String, String>,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    let name = query.get("name").map(String::as_str);
    let list = ingredients::fetch_ingredients(name, &ctx.pool).await?;

    Ok(warp::reply::json(&list))
}

pub async fn detail(id: i32, ctx: ApiContext) -> Result<impl Reply, Rejection> {
    let ingredient = ingredients::get_ingredient(id, &ctx.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("ingredient does not exist")))?;

    Ok(warp::reply::json(&ingredient))
}
