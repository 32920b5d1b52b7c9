use std::convert::Infallible;
use std::path::PathBuf;

use sqlx::{Pool, Postgres};
use warp::Filter;

use crate::config::Config;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiContext {
    pub pool: Pool<Postgres>,
    pub jwt_secret: String,
    pub media_root: PathBuf,
}

impl ApiContext {
    pub fn new(pool: Pool<Postgres>, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            media_root: config.media_root.clone(),
        }
    }
}

pub fn with_context(
    ctx: ApiContext,
) -> impl Filter<Extract = (ApiContext,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}
