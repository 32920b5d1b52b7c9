use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing_subscriber::EnvFilter;

use foodgram::actions::{ingredients, tags};
use foodgram::form::is_hex_color;
use foodgram::Config;

#[derive(Debug, Deserialize)]
struct IngredientFixture {
    name: String,
    measurement_unit: String,
}

#[derive(Debug, Deserialize)]
struct TagFixture {
    name: String,
    color: String,
    slug: String,
}

/// Loads the ingredient and tag fixtures from `data/`. Rows that already
/// exist are skipped, so the loader can run repeatedly.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    load_ingredients(Path::new("data/ingredients.json"), &pool).await?;
    load_tags(Path::new("data/tags.json"), &pool).await?;

    Ok(())
}

async fn load_ingredients(path: &Path, pool: &Pool<Postgres>) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let fixtures: Vec<IngredientFixture> =
        serde_json::from_str(&raw).with_context(|| format!("invalid json in {}", path.display()))?;

    let mut inserted = 0usize;
    let total = fixtures.len();
    for fixture in fixtures {
        if ingredients::create_ingredient(&fixture.name, &fixture.measurement_unit, pool).await? {
            inserted += 1;
        }
    }

    log::info!("ingredients: inserted {inserted} of {total}");
    Ok(())
}

async fn load_tags(path: &Path, pool: &Pool<Postgres>) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let fixtures: Vec<TagFixture> =
        serde_json::from_str(&raw).with_context(|| format!("invalid json in {}", path.display()))?;

    let mut inserted = 0usize;
    let total = fixtures.len();
    for fixture in fixtures {
        if !is_hex_color(&fixture.color) {
            bail!("tag {} has invalid color {}", fixture.slug, fixture.color);
        }
        if tags::create_tag(&fixture.name, &fixture.color, &fixture.slug, pool).await? {
            inserted += 1;
        }
    }

    log::info!("tags: inserted {inserted} of {total}");
    Ok(())
}
