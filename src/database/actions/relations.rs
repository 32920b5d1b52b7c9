use sqlx::{Pool, Postgres};

use crate::error::ApiError;

/// The three toggle relations share one add/remove implementation; the
/// variant picks the backing table and object column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Favorite,
    ShoppingCart,
    Subscription,
}

impl Relation {
    fn table(self) -> &'static str {
        match self {
            Relation::Favorite => "favorites",
            Relation::ShoppingCart => "shopping_cart",
            Relation::Subscription => "subscriptions",
        }
    }

    fn object_column(self) -> &'static str {
        match self {
            Relation::Favorite | Relation::ShoppingCart => "recipe_id",
            Relation::Subscription => "author_id",
        }
    }

    fn duplicate_detail(self) -> &'static str {
        match self {
            Relation::Favorite => "recipe is already in favorites",
            Relation::ShoppingCart => "recipe is already in the shopping cart",
            Relation::Subscription => "you are already subscribed to this author",
        }
    }

    fn missing_detail(self) -> &'static str {
        match self {
            Relation::Favorite => "recipe is not in favorites",
            Relation::ShoppingCart => "recipe is not in the shopping cart",
            Relation::Subscription => "you are not subscribed to this author",
        }
    }

    /// Write-time invariant; only subscriptions forbid subject == object.
    pub fn validate_pair(self, user_id: i32, object_id: i32) -> Result<(), ApiError> {
        if self == Relation::Subscription && user_id == object_id {
            return Err(ApiError::Validation(String::from(
                "you cannot subscribe to yourself",
            )));
        }
        Ok(())
    }
}

/// Adds the relation row. A racing duplicate writer loses at the database:
/// `ON CONFLICT DO NOTHING` reports zero affected rows, which surfaces as
/// `Conflict`.
pub async fn add_relation(
    relation: Relation,
    user_id: i32,
    object_id: i32,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    relation.validate_pair(user_id, object_id)?;

    let query = format!(
        "INSERT INTO {} (user_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        relation.table(),
        relation.object_column()
    );
    let result = sqlx::query(&query)
        .bind(user_id)
        .bind(object_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::Conflict(String::from(relation.duplicate_detail())));
    }

    Ok(())
}

/// Removes the relation row; zero rows deleted means it never existed.
pub async fn remove_relation(
    relation: Relation,
    user_id: i32,
    object_id: i32,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    let query = format!(
        "DELETE FROM {} WHERE user_id = $1 AND {} = $2",
        relation.table(),
        relation.object_column()
    );
    let result = sqlx::query(&query)
        .bind(user_id)
        .bind(object_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(String::from(relation.missing_detail())));
    }

    Ok(())
}

pub async fn relation_exists(
    relation: Relation,
    user_id: i32,
    object_id: i32,
    pool: &Pool<Postgres>,
) -> Result<bool, ApiError> {
    let query = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = $1 AND {} = $2)",
        relation.table(),
        relation.object_column()
    );
    let row: (bool,) = sqlx::query_as(&query)
        .bind(user_id)
        .bind(object_id)
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_subscription_is_rejected() {
        assert!(matches!(
            Relation::Subscription.validate_pair(5, 5),
            Err(ApiError::Validation(_))
        ));
        assert!(Relation::Subscription.validate_pair(5, 6).is_ok());
    }

    #[test]
    fn recipe_relations_allow_own_recipes() {
        assert!(Relation::Favorite.validate_pair(5, 5).is_ok());
        assert!(Relation::ShoppingCart.validate_pair(5, 5).is_ok());
    }

    #[test]
    fn relation_tables_and_columns() {
        assert_eq!(Relation::Favorite.table(), "favorites");
        assert_eq!(Relation::Favorite.object_column(), "recipe_id");
        assert_eq!(Relation::Subscription.table(), "subscriptions");
        assert_eq!(Relation::Subscription.object_column(), "author_id");
    }
}
