use std::collections::{HashMap, HashSet};

use sqlx::{Pool, Postgres, QueryBuilder, Transaction};

use crate::authentication::{jwt::SessionData, permissions::ActionType};
use crate::error::ApiError;
use crate::form::{IngredientAmount, RecipeForm};
use crate::media;
use crate::pagination::{Page, PageParams};
use crate::schema::{
    Recipe, RecipeIngredientRow, RecipeIngredientView, RecipeListRow, RecipeTagRow, RecipeView,
    ShortRecipeView, Tag, UserView,
};

/// Listing filters parsed from the query string. Flag filters apply to the
/// viewer; for anonymous requesters they match nothing.
#[derive(Debug, Default, Clone)]
pub struct RecipeFilter {
    pub author: Option<i32>,
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

pub async fn fetch_recipes(
    filter: &RecipeFilter,
    viewer: Option<i32>,
    params: &PageParams,
    pool: &Pool<Postgres>,
) -> Result<Page<RecipeView>, ApiError> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT r.id, r.author_id, r.name, r.text, r.image, r.cooking_time,
            EXISTS(SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ",
    );
    query.push_bind(viewer);
    query.push(
        ") AS is_favorited,
            EXISTS(SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ",
    );
    query.push_bind(viewer);
    query.push(
        ") AS is_in_shopping_cart,
            COUNT(*) OVER() AS count
        FROM recipes r
        WHERE TRUE",
    );

    if let Some(author) = filter.author {
        query.push(" AND r.author_id = ");
        query.push_bind(author);
    }
    if !filter.tags.is_empty() {
        query.push(
            " AND EXISTS(SELECT 1 FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id \
             WHERE rt.recipe_id = r.id AND t.slug = ANY(",
        );
        query.push_bind(filter.tags.clone());
        query.push("))");
    }
    if filter.is_favorited {
        query.push(" AND EXISTS(SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ");
        query.push_bind(viewer);
        query.push(")");
    }
    if filter.is_in_shopping_cart {
        query.push(
            " AND EXISTS(SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ",
        );
        query.push_bind(viewer);
        query.push(")");
    }

    query.push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ");
    query.push_bind(params.limit());
    query.push(" OFFSET ");
    query.push_bind(params.offset());

    let rows: Vec<RecipeListRow> = query.build_query_as().fetch_all(pool).await?;

    let total = rows.first().map(|r| r.count).unwrap_or(0);
    let views = assemble_recipe_views(rows, viewer, pool).await?;

    Ok(Page::from_rows(views, total, params))
}

pub async fn get_recipe_view(
    id: i32,
    viewer: Option<i32>,
    pool: &Pool<Postgres>,
) -> Result<RecipeView, ApiError> {
    let row: Option<RecipeListRow> = sqlx::query_as(
        "
        SELECT r.id, r.author_id, r.name, r.text, r.image, r.cooking_time,
            EXISTS(SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = $1)
                AS is_favorited,
            EXISTS(SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = $1)
                AS is_in_shopping_cart,
            COUNT(*) OVER() AS count
        FROM recipes r
        WHERE r.id = $2
    ",
    )
    .bind(viewer)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let row = row.ok_or_else(|| ApiError::NotFound(String::from("recipe does not exist")))?;
    let mut views = assemble_recipe_views(vec![row], viewer, pool).await?;

    views
        .pop()
        .ok_or_else(|| ApiError::Internal(String::from("recipe view assembly produced no rows")))
}

pub async fn get_recipe(id: i32, pool: &Pool<Postgres>) -> Result<Option<Recipe>, ApiError> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_short_recipe(
    id: i32,
    pool: &Pool<Postgres>,
) -> Result<Option<ShortRecipeView>, ApiError> {
    let row: Option<ShortRecipeView> =
        sqlx::query_as("SELECT id, name, image, cooking_time FROM recipes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|mut view| {
        view.image = media::image_url(&view.image);
        view
    }))
}

/// Fetches a recipe for mutation: the session must be allowed to manage its
/// own recipes, and must either own this one or hold the manage-all action.
pub async fn get_recipe_mut(
    id: i32,
    session: &SessionData,
    pool: &Pool<Postgres>,
) -> Result<Recipe, ApiError> {
    let recipe = get_recipe(id, pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("recipe does not exist")))?;

    session.authorize(ActionType::ManageOwnRecipes)?;

    if recipe.author_id != session.user_id {
        session.authorize(ActionType::ManageAllRecipes).map_err(|_| {
            ApiError::Forbidden(String::from("you are not the author of this recipe"))
        })?;
    }

    Ok(recipe)
}

/// Creates the recipe and its ingredient and tag sets in one transaction.
pub async fn create_recipe(
    author_id: i32,
    form: &RecipeForm,
    image_path: String,
    pool: &Pool<Postgres>,
) -> Result<i32, ApiError> {
    let ingredient_ids: Vec<i32> = form.ingredients.iter().map(|i| i.id).collect();
    ensure_ingredients_exist(&ingredient_ids, pool).await?;
    ensure_tags_exist(&form.tags, pool).await?;

    let mut tx = pool.begin().await?;

    let recipe: (i32,) = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, text, image, cooking_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
    ",
    )
    .bind(author_id)
    .bind(&form.name)
    .bind(&form.text)
    .bind(image_path)
    .bind(form.cooking_time)
    .fetch_one(&mut *tx)
    .await?;

    insert_recipe_ingredients(&mut tx, recipe.0, &form.ingredients).await?;
    insert_recipe_tags(&mut tx, recipe.0, &form.tags).await?;

    tx.commit().await?;

    Ok(recipe.0)
}

/// Full replacement: base columns updated, ingredient and tag sets cleared
/// and re-inserted, all inside one transaction. `image_path` of `None`
/// keeps the stored image.
pub async fn update_recipe(
    recipe: &Recipe,
    form: &RecipeForm,
    image_path: Option<String>,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    let ingredient_ids: Vec<i32> = form.ingredients.iter().map(|i| i.id).collect();
    ensure_ingredients_exist(&ingredient_ids, pool).await?;
    ensure_tags_exist(&form.tags, pool).await?;

    let image = image_path.unwrap_or_else(|| recipe.image.clone());

    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE recipes SET name = $1, text = $2, image = $3, cooking_time = $4 WHERE id = $5",
    )
    .bind(&form.name)
    .bind(&form.text)
    .bind(image)
    .bind(form.cooking_time)
    .bind(recipe.id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe.id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe.id)
        .execute(&mut *tx)
        .await?;

    insert_recipe_ingredients(&mut tx, recipe.id, &form.ingredients).await?;
    insert_recipe_tags(&mut tx, recipe.id, &form.tags).await?;

    tx.commit().await?;

    Ok(())
}

pub async fn delete_recipe(id: i32, pool: &Pool<Postgres>) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

async fn insert_recipe_ingredients(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i32,
    parts: &[IngredientAmount],
) -> Result<(), ApiError> {
    if parts.is_empty() {
        return Ok(());
    }

    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ");
    query.push_values(parts, |mut b, part| {
        b.push_bind(recipe_id)
            .push_bind(part.id)
            .push_bind(part.amount);
    });
    query.build().execute(&mut **tx).await?;

    Ok(())
}

async fn insert_recipe_tags(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i32,
    tag_ids: &[i32],
) -> Result<(), ApiError> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");
    query.push_values(tag_ids, |mut b, tag_id| {
        b.push_bind(recipe_id).push_bind(*tag_id);
    });
    query.build().execute(&mut **tx).await?;

    Ok(())
}

async fn ensure_ingredients_exist(ids: &[i32], pool: &Pool<Postgres>) -> Result<(), ApiError> {
    let known: Vec<(i32,)> = sqlx::query_as("SELECT id FROM ingredients WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    let known: HashSet<i32> = known.into_iter().map(|r| r.0).collect();

    for id in ids {
        if !known.contains(id) {
            return Err(ApiError::Validation(format!("unknown ingredient id {id}")));
        }
    }

    Ok(())
}

async fn ensure_tags_exist(ids: &[i32], pool: &Pool<Postgres>) -> Result<(), ApiError> {
    let known: Vec<(i32,)> = sqlx::query_as("SELECT id FROM tags WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    let known: HashSet<i32> = known.into_iter().map(|r| r.0).collect();

    for id in ids {
        if !known.contains(id) {
            return Err(ApiError::Validation(format!("unknown tag id {id}")));
        }
    }

    Ok(())
}

/// Joins authors, tags and ingredients onto a page of recipe rows. Tags and
/// ingredients are fetched once for the whole page and grouped per recipe.
async fn assemble_recipe_views(
    rows: Vec<RecipeListRow>,
    viewer: Option<i32>,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeView>, ApiError> {
    if rows.is_empty() {
        return Ok(vec![]);
    }

    let recipe_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let author_ids: Vec<i32> = rows.iter().map(|r| r.author_id).collect();

    let authors = fetch_author_views(&author_ids, viewer, pool).await?;
    let mut tags = fetch_recipe_tags(&recipe_ids, pool).await?;
    let mut ingredients = fetch_recipe_ingredients(&recipe_ids, pool).await?;

    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
        let author = authors.get(&row.author_id).cloned().ok_or_else(|| {
            ApiError::Internal(format!("recipe {} references a missing author", row.id))
        })?;

        views.push(RecipeView {
            id: row.id,
            tags: tags.remove(&row.id).unwrap_or_default(),
            author,
            ingredients: ingredients.remove(&row.id).unwrap_or_default(),
            is_favorited: row.is_favorited,
            is_in_shopping_cart: row.is_in_shopping_cart,
            name: row.name,
            image: media::image_url(&row.image),
            text: row.text,
            cooking_time: row.cooking_time,
        });
    }

    Ok(views)
}

async fn fetch_author_views(
    author_ids: &[i32],
    viewer: Option<i32>,
    pool: &Pool<Postgres>,
) -> Result<HashMap<i32, UserView>, ApiError> {
    let rows: Vec<UserView> = sqlx::query_as(
        "
        SELECT u.email, u.id, u.username, u.first_name, u.last_name,
            EXISTS(SELECT 1 FROM subscriptions s WHERE s.author_id = u.id AND s.user_id = $1)
                AS is_subscribed
        FROM users u
        WHERE u.id = ANY($2)
    ",
    )
    .bind(viewer)
    .bind(author_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|view| (view.id, view)).collect())
}

async fn fetch_recipe_tags(
    recipe_ids: &[i32],
    pool: &Pool<Postgres>,
) -> Result<HashMap<i32, Vec<Tag>>, ApiError> {
    let rows: Vec<RecipeTagRow> = sqlx::query_as(
        "
        SELECT rt.recipe_id, t.id, t.name, t.color, t.slug
        FROM recipe_tags rt
        INNER JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id = ANY($1)
        ORDER BY t.id
    ",
    )
    .bind(recipe_ids)
    .fetch_all(pool)
    .await?;

    let mut map: HashMap<i32, Vec<Tag>> = HashMap::new();
    for row in rows {
        map.entry(row.recipe_id).or_default().push(Tag {
            id: row.id,
            name: row.name,
            color: row.color,
            slug: row.slug,
        });
    }

    Ok(map)
}

async fn fetch_recipe_ingredients(
    recipe_ids: &[i32],
    pool: &Pool<Postgres>,
) -> Result<HashMap<i32, Vec<RecipeIngredientView>>, ApiError> {
    let rows: Vec<RecipeIngredientRow> = sqlx::query_as(
        "
        SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ANY($1)
        ORDER BY i.id
    ",
    )
    .bind(recipe_ids)
    .fetch_all(pool)
    .await?;

    let mut map: HashMap<i32, Vec<RecipeIngredientView>> = HashMap::new();
    for row in rows {
        map.entry(row.recipe_id)
            .or_default()
            .push(RecipeIngredientView {
                id: row.id,
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount: row.amount,
            });
    }

    Ok(map)
}
