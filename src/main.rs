use std::net::IpAddr;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use foodgram::context::ApiContext;
use foodgram::routes::routes;
use foodgram::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("foodgram=info,warp=info")),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(16)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    tokio::fs::create_dir_all(config.media_root.join("recipes/images"))
        .await
        .context("failed to create the media directory")?;

    let host: IpAddr = config
        .host
        .parse()
        .context("HOST is not a valid IP address")?;
    let port = config.port;

    log::info!("listening on {host}:{port}");
    warp::serve(routes(ApiContext::new(pool, &config)))
        .run((host, port))
        .await;

    Ok(())
}
