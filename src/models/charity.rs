use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::pool_from_ctx;
use crate::models::event::Event;
use crate::models::Money;

#[derive(SimpleObject, sqlx::FromRow, Clone, Debug)]
#[graphql(complex)]
pub struct Charity {
    /// The ID of the charity
    pub id: i64,
    /// The name of the charity
    pub name: String,
    /// Charity link
    pub url: String,
    /// External donations to add to metrics
    pub donations: Money,
}

#[ComplexObject]
impl Charity {
    /// The events raising money for this charity
    pub async fn events(&self, ctx: &Context<'_>) -> Result<Vec<Event>> {
        Event::for_charity(self.id, pool_from_ctx(ctx)).await
    }
}

impl Charity {
    pub async fn with_id(id: i64, pool: &SqlitePool) -> Result<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| format!("No charity with id {}", id).into())
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT id, name, url, donations FROM charities WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT id, name, url, donations FROM charities ORDER BY name, id")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn create(new_charity: NewCharity, pool: &SqlitePool) -> Result<i64> {
        let id = sqlx::query("INSERT INTO charities (name, url, donations) VALUES (?, ?, ?)")
            .bind(&new_charity.name)
            .bind(&new_charity.url)
            .bind(new_charity.donations)
            .execute(pool)
            .await?
            .last_insert_rowid();
        info!(id, name = %new_charity.name, "created charity");

        Ok(id)
    }

    pub async fn update(id: i64, update: NewCharity, pool: &SqlitePool) -> Result<()> {
        // verify exists
        Self::with_id(id, pool).await?;

        sqlx::query("UPDATE charities SET name = ?, url = ?, donations = ? WHERE id = ?")
            .bind(&update.name)
            .bind(&update.url)
            .bind(update.donations)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Events pointing at this charity keep existing with no charity set.
    pub async fn delete(id: i64, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM charities WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        info!(id, "deleted charity");

        Ok(())
    }
}

#[derive(InputObject, Clone)]
pub struct NewCharity {
    pub name: String,
    #[graphql(default)]
    pub url: String,
    #[graphql(default)]
    pub donations: Money,
}
