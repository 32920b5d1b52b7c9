use std::collections::HashMap;

use sqlx::{Pool, Postgres};

use crate::error::ApiError;
use crate::schema::CartLine;

/// Number of cart entries. Zero means the "cart is empty" plain-text
/// response; a non-empty cart with zero ingredient lines still renders a
/// document.
pub async fn cart_size(user_id: i32, pool: &Pool<Postgres>) -> Result<i64, ApiError> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shopping_cart WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

/// One line per (cart entry x recipe ingredient), in a deterministic order
/// so that aggregation output is stable for a given database state.
pub async fn list_cart_lines(
    user_id: i32,
    pool: &Pool<Postgres>,
) -> Result<Vec<CartLine>, ApiError> {
    let rows: Vec<CartLine> = sqlx::query_as(
        "
        SELECT i.name, i.measurement_unit, ri.amount
        FROM shopping_cart sc
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE sc.user_id = $1
        ORDER BY sc.recipe_id, ri.ingredient_id
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Groups cart lines by the display key `"<name> (<unit>)"` and sums
/// amounts. Keys are emitted in order of first occurrence.
pub fn aggregate(lines: &[CartLine]) -> Vec<(String, i64)> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, i64> = HashMap::new();

    for line in lines {
        let key = format!("{} ({})", line.name, line.measurement_unit);
        match totals.get_mut(&key) {
            Some(total) => *total += i64::from(line.amount),
            None => {
                totals.insert(key.clone(), i64::from(line.amount));
                order.push(key);
            }
        }
    }

    order
        .into_iter()
        .map(|key| {
            let total = totals.remove(&key).unwrap_or(0);
            (key, total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i32) -> CartLine {
        CartLine {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn sums_amounts_across_recipes() {
        let lines = vec![line("Salt", "g", 2), line("Salt", "g", 3)];
        let aggregated = aggregate(&lines);
        assert_eq!(aggregated, vec![(String::from("Salt (g)"), 5)]);
    }

    #[test]
    fn same_name_different_unit_stays_separate() {
        let lines = vec![line("Milk", "ml", 200), line("Milk", "g", 50)];
        let aggregated = aggregate(&lines);
        assert_eq!(
            aggregated,
            vec![
                (String::from("Milk (ml)"), 200),
                (String::from("Milk (g)"), 50),
            ]
        );
    }

    #[test]
    fn keys_keep_first_occurrence_order() {
        let lines = vec![
            line("Sugar", "g", 1),
            line("Flour", "g", 2),
            line("Sugar", "g", 4),
            line("Egg", "pcs", 3),
        ];
        let keys: Vec<String> = aggregate(&lines).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Sugar (g)", "Flour (g)", "Egg (pcs)"]);
    }

    #[test]
    fn empty_input_aggregates_to_nothing() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn totals_do_not_overflow_i32() {
        let lines = vec![line("Salt", "g", 10_000); 300_000];
        let aggregated = aggregate(&lines);
        assert_eq!(aggregated[0].1, 3_000_000_000i64);
    }
}
