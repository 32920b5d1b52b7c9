use std::collections::HashMap;

use sqlx::{Pool, Postgres};

use crate::authentication::{
    cryptography::{hash_password, verify_password},
    jwt::generate_jwt_session,
};
use crate::error::ApiError;
use crate::form::RegisterForm;
use crate::media;
use crate::pagination::{Page, PageParams};
use crate::schema::{
    AuthorRecipeRow, ShortRecipeView, SubscriptionView, User, UserRow, UserView,
};

pub async fn get_user_by_id(id: i32, pool: &Pool<Postgres>) -> Result<Option<User>, ApiError> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_user_by_email(
    email: &str,
    pool: &Pool<Postgres>,
) -> Result<Option<User>, ApiError> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Registers a new user. Duplicate email or username surfaces as `Conflict`
/// through the unique-violation mapping.
pub async fn register_user(form: &RegisterForm, pool: &Pool<Postgres>) -> Result<User, ApiError> {
    let password_hash = hash_password(&form.password)?;

    let user: User = sqlx::query_as(
        "
        INSERT INTO users (email, username, first_name, last_name, password)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
    ",
    )
    .bind(&form.email)
    .bind(&form.username)
    .bind(&form.first_name)
    .bind(&form.last_name)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn login_user(
    email: &str,
    password: &str,
    secret: &[u8],
    pool: &Pool<Postgres>,
) -> Result<String, ApiError> {
    let user = get_user_by_email(email, pool)
        .await?
        .ok_or_else(|| ApiError::Validation(String::from("invalid credentials")))?;

    if !verify_password(password, &user.password)? {
        return Err(ApiError::Validation(String::from("invalid credentials")));
    }

    generate_jwt_session(&user, secret)
}

pub async fn set_password(
    user_id: i32,
    current_password: &str,
    new_password: &str,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    let user = get_user_by_id(user_id, pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("user does not exist")))?;

    if !verify_password(current_password, &user.password)? {
        return Err(ApiError::Validation(String::from(
            "current password is incorrect",
        )));
    }

    let password_hash = hash_password(new_password)?;
    sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
        .bind(password_hash)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Profile view with the viewer-dependent `is_subscribed` flag. A NULL
/// viewer makes the EXISTS false, so anonymous reads never fail.
pub async fn get_user_view(
    id: i32,
    viewer: Option<i32>,
    pool: &Pool<Postgres>,
) -> Result<Option<UserView>, ApiError> {
    let row: Option<UserView> = sqlx::query_as(
        "
        SELECT u.email, u.id, u.username, u.first_name, u.last_name,
            EXISTS(SELECT 1 FROM subscriptions s WHERE s.author_id = u.id AND s.user_id = $1)
                AS is_subscribed
        FROM users u
        WHERE u.id = $2
    ",
    )
    .bind(viewer)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn fetch_users(
    viewer: Option<i32>,
    params: &PageParams,
    pool: &Pool<Postgres>,
) -> Result<Page<UserView>, ApiError> {
    let rows: Vec<UserRow> = sqlx::query_as(
        "
        SELECT u.email, u.id, u.username, u.first_name, u.last_name,
            EXISTS(SELECT 1 FROM subscriptions s WHERE s.author_id = u.id AND s.user_id = $1)
                AS is_subscribed,
            COUNT(*) OVER() AS count
        FROM users u
        ORDER BY u.id
        LIMIT $2 OFFSET $3
    ",
    )
    .bind(viewer)
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    let total = rows.first().map(|r| r.count).unwrap_or(0);
    let views = rows.into_iter().map(UserView::from).collect();

    Ok(Page::from_rows(views, total, params))
}

/// Author profile plus their short recipe views, used as the subscribe
/// response and in the subscriptions listing.
pub async fn get_subscription_view(
    author_id: i32,
    viewer: i32,
    pool: &Pool<Postgres>,
) -> Result<SubscriptionView, ApiError> {
    let author = get_user_view(author_id, Some(viewer), pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("author does not exist")))?;

    let mut recipes = author_short_recipes(&[author_id], pool).await?;
    let recipes = recipes.remove(&author_id).unwrap_or_default();

    Ok(subscription_view(author, recipes))
}

pub async fn fetch_subscriptions(
    user_id: i32,
    params: &PageParams,
    pool: &Pool<Postgres>,
) -> Result<Page<SubscriptionView>, ApiError> {
    let rows: Vec<UserRow> = sqlx::query_as(
        "
        SELECT u.email, u.id, u.username, u.first_name, u.last_name,
            TRUE AS is_subscribed,
            COUNT(*) OVER() AS count
        FROM subscriptions s
        INNER JOIN users u ON u.id = s.author_id
        WHERE s.user_id = $1
        ORDER BY u.id
        LIMIT $2 OFFSET $3
    ",
    )
    .bind(user_id)
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    let total = rows.first().map(|r| r.count).unwrap_or(0);
    let author_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let mut recipes = author_short_recipes(&author_ids, pool).await?;

    let views = rows
        .into_iter()
        .map(|row| {
            let author = UserView::from(row);
            let recipes = recipes.remove(&author.id).unwrap_or_default();
            subscription_view(author, recipes)
        })
        .collect();

    Ok(Page::from_rows(views, total, params))
}

fn subscription_view(author: UserView, recipes: Vec<ShortRecipeView>) -> SubscriptionView {
    SubscriptionView {
        email: author.email,
        id: author.id,
        username: author.username,
        first_name: author.first_name,
        last_name: author.last_name,
        is_subscribed: author.is_subscribed,
        recipes_count: recipes.len() as i64,
        recipes,
    }
}

async fn author_short_recipes(
    author_ids: &[i32],
    pool: &Pool<Postgres>,
) -> Result<HashMap<i32, Vec<ShortRecipeView>>, ApiError> {
    if author_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<AuthorRecipeRow> = sqlx::query_as(
        "
        SELECT author_id, id, name, image, cooking_time
        FROM recipes
        WHERE author_id = ANY($1)
        ORDER BY created_at DESC, id DESC
    ",
    )
    .bind(author_ids)
    .fetch_all(pool)
    .await?;

    let mut map: HashMap<i32, Vec<ShortRecipeView>> = HashMap::new();
    for row in rows {
        map.entry(row.author_id).or_default().push(ShortRecipeView {
            id: row.id,
            name: row.name,
            image: media::image_url(&row.image),
            cooking_time: row.cooking_time,
        });
    }

    Ok(map)
}
