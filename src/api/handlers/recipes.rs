use warp::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use warp::http::{Response, StatusCode};
use warp::reject::Rejection;
use warp::reply::Reply;

use crate::api::context::ApiContext;
use crate::constants::SHOPPING_LIST_FILENAME;
use crate::database::actions::recipes::RecipeFilter;
use crate::database::actions::relations::Relation;
use crate::database::actions::{recipes, relations, shopping_list};
use crate::error::ApiError;
use crate::form::RecipeForm;
use crate::jwt::SessionData;
use crate::media;
use crate::pagination::PageParams;
use crate::pdf;
use crate::permissions::ActionType;

/// Parses the listing query by hand: `tags` repeats, so a plain map loses
/// values. Unknown keys are ignored, malformed known keys are 400s.
pub fn parse_listing_query(raw: &str) -> Result<(RecipeFilter, PageParams), ApiError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
        .map_err(|_| ApiError::Validation(String::from("invalid query string")))?;

    let mut filter = RecipeFilter::default();
    let mut params = PageParams::default();

    for (key, value) in pairs {
        match key.as_str() {
            "tags" => filter.tags.push(value),
            "author" => {
                filter.author = Some(value.parse().map_err(|_| {
                    ApiError::Validation(String::from("author must be an integer"))
                })?);
            }
            "is_favorited" => filter.is_favorited = flag(&value),
            "is_in_shopping_cart" => filter.is_in_shopping_cart = flag(&value),
            "page" => {
                params.page = Some(value.parse().map_err(|_| {
                    ApiError::Validation(String::from("page must be an integer"))
                })?);
            }
            "limit" => {
                params.limit = Some(value.parse().map_err(|_| {
                    ApiError::Validation(String::from("limit must be an integer"))
                })?);
            }
            _ => {}
        }
    }

    Ok((filter, params))
}

fn flag(value: &str) -> bool {
    matches!(value, "1" | "true" | "True")
}

pub async fn list(
    raw_query: String,
    session: Option<SessionData>,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    let (filter, params) = parse_listing_query(&raw_query)?;
    let viewer = session.map(|s| s.user_id);
    let page = recipes::fetch_recipes(&filter, viewer, &params, &ctx.pool).await?;

    Ok(warp::reply::json(&page))
}

pub async fn detail(
    id: i32,
    session: Option<SessionData>,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    let viewer = session.map(|s| s.user_id);
    let view = recipes::get_recipe_view(id, viewer, &ctx.pool).await?;

    Ok(warp::reply::json(&view))
}

pub async fn create(
    session: SessionData,
    ctx: ApiContext,
    form: RecipeForm,
) -> Result<impl Reply, Rejection> {
    session.authorize(ActionType::PublishRecipes)?;
    form.validate(true)?;

    let data_uri = form
        .image
        .as_deref()
        .ok_or_else(|| ApiError::Validation(String::from("image is required")))?;
    let image_path = media::store_recipe_image(&ctx.media_root, data_uri).await?;

    let id = recipes::create_recipe(session.user_id, &form, image_path, &ctx.pool).await?;
    let view = recipes::get_recipe_view(id, Some(session.user_id), &ctx.pool).await?;

    Ok(warp::reply::with_status(
        warp::reply::json(&view),
        StatusCode::CREATED,
    ))
}

pub async fn update(
    id: i32,
    session: SessionData,
    ctx: ApiContext,
    form: RecipeForm,
) -> Result<impl Reply, Rejection> {
    form.validate(false)?;

    let recipe = recipes::get_recipe_mut(id, &session, &ctx.pool).await?;

    let image_path = match form.image.as_deref() {
        Some(data_uri) => Some(media::store_recipe_image(&ctx.media_root, data_uri).await?),
        None => None,
    };

    recipes::update_recipe(&recipe, &form, image_path, &ctx.pool).await?;
    let view = recipes::get_recipe_view(id, Some(session.user_id), &ctx.pool).await?;

    Ok(warp::reply::json(&view))
}

pub async fn delete(
    id: i32,
    session: SessionData,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    let recipe = recipes::get_recipe_mut(id, &session, &ctx.pool).await?;
    recipes::delete_recipe(recipe.id, &ctx.pool).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_to_favorites(
    id: i32,
    session: SessionData,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    toggle_on(Relation::Favorite, id, session, ctx).await
}

pub async fn remove_from_favorites(
    id: i32,
    session: SessionData,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    toggle_off(Relation::Favorite, id, session, ctx).await
}

pub async fn add_to_shopping_cart(
    id: i32,
    session: SessionData,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    toggle_on(Relation::ShoppingCart, id, session, ctx).await
}

pub async fn remove_from_shopping_cart(
    id: i32,
    session: SessionData,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    toggle_off(Relation::ShoppingCart, id, session, ctx).await
}

async fn toggle_on(
    relation: Relation,
    recipe_id: i32,
    session: SessionData,
    ctx: ApiContext,
) -> Result<warp::reply::Response, Rejection> {
    let short = recipes::get_short_recipe(recipe_id, &ctx.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("recipe does not exist")))?;

    relations::add_relation(relation, session.user_id, recipe_id, &ctx.pool).await?;

    Ok(warp::reply::with_status(warp::reply::json(&short), StatusCode::CREATED).into_response())
}

async fn toggle_off(
    relation: Relation,
    recipe_id: i32,
    session: SessionData,
    ctx: ApiContext,
) -> Result<warp::reply::Response, Rejection> {
    relations::remove_relation(relation, session.user_id, recipe_id, &ctx.pool).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Aggregates the cart into a PDF attachment. An empty cart short-circuits
/// with a plain-text body instead of an empty document.
pub async fn download_shopping_cart(
    session: SessionData,
    ctx: ApiContext,
) -> Result<impl Reply, Rejection> {
    if shopping_list::cart_size(session.user_id, &ctx.pool).await? == 0 {
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Vec::from(&b"shopping cart is empty"[..]))
            .map_err(|e| ApiError::Internal(format!("failed to build response: {e}")))?;
        return Ok(response);
    }

    let lines = shopping_list::list_cart_lines(session.user_id, &ctx.pool).await?;
    let aggregated = shopping_list::aggregate(&lines);
    let document = pdf::render_shopping_list(&aggregated)?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/pdf")
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
        )
        .body(document)
        .map_err(|e| ApiError::Internal(format!("failed to build response: {e}")))?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_tags_collect_into_the_filter() {
        let (filter, _) = parse_listing_query("tags=breakfast&tags=dinner").unwrap();
        assert_eq!(filter.tags, vec!["breakfast", "dinner"]);
    }

    #[test]
    fn flags_author_and_pagination_parse_together() {
        let (filter, params) =
            parse_listing_query("author=3&is_favorited=1&is_in_shopping_cart=true&page=2&limit=10")
                .unwrap();
        assert_eq!(filter.author, Some(3));
        assert!(filter.is_favorited);
        assert!(filter.is_in_shopping_cart);
        assert_eq!(params.page, Some(2));
        assert_eq!(params.limit, Some(10));
    }

    #[test]
    fn zero_flag_means_off() {
        let (filter, _) = parse_listing_query("is_favorited=0").unwrap();
        assert!(!filter.is_favorited);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (filter, params) = parse_listing_query("recipes_limit=3&foo=bar").unwrap();
        assert!(filter.tags.is_empty());
        assert_eq!(params.page, None);
    }

    #[test]
    fn non_numeric_author_is_rejected() {
        assert!(parse_listing_query("author=me").is_err());
    }

    #[test]
    fn empty_query_yields_defaults() {
        let (filter, params) = parse_listing_query("").unwrap();
        assert_eq!(filter.author, None);
        assert_eq!(params.limit(), crate::constants::DEFAULT_PAGE_SIZE);
    }
}
