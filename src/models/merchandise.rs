use std::fmt;

use async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::pool_from_ctx;
use crate::models::Money;

#[derive(sqlx::Type, Clone, Copy, Debug, PartialEq, Eq, Enum)]
pub enum MerchandiseCategory {
    #[sqlx(rename = "S")]
    Shirt,
    #[sqlx(rename = "A")]
    Accessory,
    #[sqlx(rename = "B")]
    Book,
    #[sqlx(rename = "MISC")]
    Misc,
}

impl MerchandiseCategory {
    pub fn label(&self) -> &'static str {
        match self {
            MerchandiseCategory::Shirt => "Shirt",
            MerchandiseCategory::Accessory => "Accessory",
            MerchandiseCategory::Book => "Book",
            MerchandiseCategory::Misc => "Misc.",
        }
    }
}

#[derive(SimpleObject, sqlx::FromRow, Clone, Debug)]
#[graphql(complex)]
pub struct Merchandise {
    /// The ID of the item
    pub id: i64,
    /// The name of the item
    pub name: String,
    /// How many are in stock
    pub quantity: i64,
    /// What kind of item this is
    pub category: MerchandiseCategory,
}

#[ComplexObject]
impl Merchandise {
    /// The purchasable options for this item, by rank
    pub async fn options(&self, ctx: &Context<'_>) -> Result<Vec<PriceLevelOption>> {
        PriceLevelOption::for_merchandise(self.id, pool_from_ctx(ctx)).await
    }

    /// The human-readable name of the category
    pub async fn category_label(&self) -> &'static str {
        self.category.label()
    }
}

impl Merchandise {
    pub async fn with_id(id: i64, pool: &SqlitePool) -> Result<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| format!("No merchandise with id {}", id).into())
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT id, name, quantity, category FROM merchandise WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, name, quantity, category FROM merchandise ORDER BY name, id",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn create(new_merchandise: NewMerchandise, pool: &SqlitePool) -> Result<i64> {
        let id = sqlx::query("INSERT INTO merchandise (name, quantity, category) VALUES (?, ?, ?)")
            .bind(&new_merchandise.name)
            .bind(new_merchandise.quantity)
            .bind(new_merchandise.category)
            .execute(pool)
            .await?
            .last_insert_rowid();
        info!(id, name = %new_merchandise.name, "created merchandise");

        Ok(id)
    }

    pub async fn update(id: i64, update: NewMerchandise, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("UPDATE merchandise SET name = ?, quantity = ?, category = ? WHERE id = ?")
            .bind(&update.name)
            .bind(update.quantity)
            .bind(update.category)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Also deletes every price level option for the item.
    pub async fn delete(id: i64, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM merchandise WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        info!(id, "deleted merchandise");

        Ok(())
    }
}

#[derive(InputObject, Clone)]
pub struct NewMerchandise {
    pub name: String,
    pub quantity: i64,
    pub category: MerchandiseCategory,
}

const OPTION_COLUMNS: &str =
    "id, name, price, merch_id, option_image, active, rank, description, public";

/// A purchasable option (size, tier, bundle) for a merchandise item
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug)]
#[graphql(complex)]
pub struct PriceLevelOption {
    /// The ID of the option
    pub id: i64,
    /// The name of the option
    pub name: String,
    /// What the option costs
    pub price: Money,
    /// The ID of the merchandise item this option belongs to
    pub merch_id: i64,
    /// Where the option's image is stored, relative to the media root
    pub option_image: Option<String>,
    /// Whether the option can currently be bought
    pub active: bool,
    /// Options are shown in ascending rank
    pub rank: i64,
    pub description: String,
    /// Whether the option is shown to the public
    pub public: bool,
}

#[ComplexObject]
impl PriceLevelOption {
    /// The merchandise item this option belongs to
    pub async fn merchandise(&self, ctx: &Context<'_>) -> Result<Merchandise> {
        Merchandise::with_id(self.merch_id, pool_from_ctx(ctx)).await
    }

    /// The option as shown in lists, like `Basic ($25.00)`
    pub async fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PriceLevelOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (${})", self.name, self.price)
    }
}

impl PriceLevelOption {
    pub async fn with_id(id: i64, pool: &SqlitePool) -> Result<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| format!("No price level option with id {}", id).into())
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM price_level_options WHERE id = ?",
            OPTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM price_level_options ORDER BY merch_id, rank, id",
            OPTION_COLUMNS
        ))
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn for_merchandise(merch_id: i64, pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM price_level_options WHERE merch_id = ? ORDER BY rank, id",
            OPTION_COLUMNS
        ))
        .bind(merch_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn create(new_option: NewPriceLevelOption, pool: &SqlitePool) -> Result<i64> {
        let id = sqlx::query(
            "INSERT INTO price_level_options (name, price, merch_id, active, rank, description,
                 public)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_option.name)
        .bind(new_option.price)
        .bind(new_option.merch_id)
        .bind(new_option.active)
        .bind(new_option.rank)
        .bind(&new_option.description)
        .bind(new_option.public)
        .execute(pool)
        .await?
        .last_insert_rowid();
        info!(id, merch_id = new_option.merch_id, "created price level option");

        Ok(id)
    }

    pub async fn update(id: i64, update: NewPriceLevelOption, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query(
            "UPDATE price_level_options SET name = ?, price = ?, merch_id = ?, active = ?,
                 rank = ?, description = ?, public = ?
             WHERE id = ?",
        )
        .bind(&update.name)
        .bind(update.price)
        .bind(update.merch_id)
        .bind(update.active)
        .bind(update.rank)
        .bind(&update.description)
        .bind(update.public)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn set_option_image(
        id: i64,
        option_image: Option<&str>,
        pool: &SqlitePool,
    ) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("UPDATE price_level_options SET option_image = ? WHERE id = ?")
            .bind(option_image)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn delete(id: i64, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM price_level_options WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        info!(id, "deleted price level option");

        Ok(())
    }
}

#[derive(InputObject, Clone)]
pub struct NewPriceLevelOption {
    pub name: String,
    pub price: Money,
    pub merch_id: i64,
    #[graphql(default)]
    pub active: bool,
    #[graphql(default)]
    pub rank: i64,
    #[graphql(default)]
    pub description: String,
    pub public: bool,
}
