use std::collections::HashMap;

use serde::de::DeserializeOwned;
use warp::reject::Rejection;
use warp::reply::Reply;
use warp::Filter;

use super::context::{with_context, ApiContext};
use super::handlers::{auth, ingredients, recipes, tags, users};
use super::rejection::handle_rejection;
use crate::constants::MAX_JSON_BODY_BYTES;
use crate::middleware::{with_possible_session, with_session};
use crate::pagination::PageParams;

/// The complete filter tree: `/api/...`, static `/media/...`, request
/// logging and rejection handling. Exact path segments are matched before
/// parameter segments so `users/me` never parses as `users/{id}`.
pub fn routes(
    ctx: ApiContext,
) -> impl Filter<Extract = (impl Reply,), Error = std::convert::Infallible> + Clone {
    let media = warp::path("media").and(warp::fs::dir(ctx.media_root.clone()));

    api_routes(ctx)
        .or(media)
        .with(warp::log("foodgram::api"))
        .recover(handle_rejection)
}

fn api_routes(
    ctx: ApiContext,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    auth_routes(ctx.clone())
        .or(user_routes(ctx.clone()))
        .or(tag_routes(ctx.clone()))
        .or(ingredient_routes(ctx.clone()))
        .or(recipe_routes(ctx))
}

fn auth_routes(
    ctx: ApiContext,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let login = warp::post()
        .and(warp::path!("api" / "auth" / "token" / "login"))
        .and(with_context(ctx.clone()))
        .and(json_body())
        .and_then(auth::login);

    let logout = warp::post()
        .and(warp::path!("api" / "auth" / "token" / "logout"))
        .and(with_session(ctx.jwt_secret))
        .and_then(auth::logout);

    login.or(logout)
}

fn user_routes(
    ctx: ApiContext,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let register = warp::post()
        .and(warp::path!("api" / "users"))
        .and(with_context(ctx.clone()))
        .and(json_body())
        .and_then(users::register);

    let list = warp::get()
        .and(warp::path!("api" / "users"))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(warp::query::<PageParams>())
        .and(with_context(ctx.clone()))
        .and_then(users::list);

    let me = warp::get()
        .and(warp::path!("api" / "users" / "me"))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(users::me);

    let set_password = warp::post()
        .and(warp::path!("api" / "users" / "set_password"))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and(json_body())
        .and_then(users::set_password);

    let subscriptions = warp::get()
        .and(warp::path!("api" / "users" / "subscriptions"))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(warp::query::<PageParams>())
        .and(with_context(ctx.clone()))
        .and_then(users::subscriptions);

    let profile = warp::get()
        .and(warp::path!("api" / "users" / i32))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(users::profile);

    let subscribe = warp::post()
        .and(warp::path!("api" / "users" / i32 / "subscribe"))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(users::subscribe);

    let unsubscribe = warp::delete()
        .and(warp::path!("api" / "users" / i32 / "subscribe"))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx))
        .and_then(users::unsubscribe);

    register
        .or(me)
        .or(set_password)
        .or(subscriptions)
        .or(list)
        .or(subscribe)
        .or(unsubscribe)
        .or(profile)
}

fn tag_routes(
    ctx: ApiContext,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::get()
        .and(warp::path!("api" / "tags"))
        .and(with_context(ctx.clone()))
        .and_then(tags::list);

    let detail = warp::get()
        .and(warp::path!("api" / "tags" / i32))
        .and(with_context(ctx))
        .and_then(tags::detail);

    list.or(detail)
}

fn ingredient_routes(
    ctx: ApiContext,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::get()
        .and(warp::path!("api" / "ingredients"))
        .and(warp::query::<HashMap<String, String>>())
        .and(with_context(ctx.clone()))
        .and_then(ingredients::list);

    let detail = warp::get()
        .and(warp::path!("api" / "ingredients" / i32))
        .and(with_context(ctx))
        .and_then(ingredients::detail);

    list.or(detail)
}

fn recipe_routes(
    ctx: ApiContext,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::get()
        .and(warp::path!("api" / "recipes"))
        .and(raw_query())
        .and(with_possible_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(recipes::list);

    let create = warp::post()
        .and(warp::path!("api" / "recipes"))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and(json_body())
        .and_then(recipes::create);

    let download = warp::get()
        .and(warp::path!("api" / "recipes" / "download_shopping_cart"))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(recipes::download_shopping_cart);

    let detail = warp::get()
        .and(warp::path!("api" / "recipes" / i32))
        .and(with_possible_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(recipes::detail);

    let update = warp::put()
        .or(warp::patch())
        .unify()
        .and(warp::path!("api" / "recipes" / i32))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and(json_body())
        .and_then(recipes::update);

    let delete = warp::delete()
        .and(warp::path!("api" / "recipes" / i32))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(recipes::delete);

    let favorite = warp::post()
        .and(warp::path!("api" / "recipes" / i32 / "favorite"))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(recipes::add_to_favorites);

    let unfavorite = warp::delete()
        .and(warp::path!("api" / "recipes" / i32 / "favorite"))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(recipes::remove_from_favorites);

    let cart_add = warp::post()
        .and(warp::path!("api" / "recipes" / i32 / "shopping_cart"))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(recipes::add_to_shopping_cart);

    let cart_remove = warp::delete()
        .and(warp::path!("api" / "recipes" / i32 / "shopping_cart"))
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx))
        .and_then(recipes::remove_from_shopping_cart);

    list.or(create)
        .or(download)
        .or(favorite)
        .or(unfavorite)
        .or(cart_add)
        .or(cart_remove)
        .or(detail)
        .or(update)
        .or(delete)
}

fn json_body<T: DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_JSON_BODY_BYTES).and(warp::body::json())
}

/// The raw query string, empty when the request has none.
fn raw_query() -> impl Filter<Extract = (String,), Error = Rejection> + Clone {
    warp::query::raw().or_else(|_| std::future::ready(Ok::<_, Rejection>((String::new(),))))
}

#[cfg(test)]
mod tests {
    use super::raw_query;

    #[tokio::test]
    async fn raw_query_passes_the_query_string_through() {
        let raw = warp::test::request()
            .path("/recipes?tags=breakfast&tags=dinner&page=2")
            .filter(&raw_query())
            .await
            .unwrap();
        assert_eq!(raw, "tags=breakfast&tags=dinner&page=2");
    }

    #[tokio::test]
    async fn missing_query_string_yields_empty() {
        let raw = warp::test::request()
            .path("/recipes")
            .filter(&raw_query())
            .await
            .unwrap();
        assert_eq!(raw, "");
    }
}
