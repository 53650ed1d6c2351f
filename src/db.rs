use std::str::FromStr;

use async_graphql::Context;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{RegcoreError, RegcoreResult};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens a pool against `database_url` with foreign keys enforced, then brings
/// the schema up to date.
///
/// Every connection to `:memory:` is its own database, so in-memory pools are
/// pinned to a single connection that is never recycled.
pub async fn connect(database_url: &str) -> RegcoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(RegcoreError::Connection)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };
    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(RegcoreError::Connection)?;

    migrate(&pool).await?;
    info!(database_url, "connected to database");

    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> RegcoreResult<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

pub fn pool_from_ctx<'c>(ctx: &Context<'c>) -> &'c SqlitePool {
    ctx.data_unchecked::<SqlitePool>()
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    connect("sqlite::memory:")
        .await
        .expect("in-memory database with migrations")
}
