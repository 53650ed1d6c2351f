use std::fmt;

use async_graphql::{ComplexObject, InputObject, Result, SimpleObject};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::models::{GqlDateTime, Money};
use crate::util::now;

const DISCOUNT_COLUMNS: &str =
    "id, code_name, percent_off, amount_off, start_date, end_date, notes, single_use, used, reason";

/// A promotional code
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug)]
#[graphql(complex)]
pub struct Discount {
    /// The ID of the discount
    pub id: i64,
    /// The code entered to claim the discount
    pub code_name: String,
    /// Percentage taken off, if any
    pub percent_off: Option<i32>,
    /// Flat amount taken off, if any
    pub amount_off: Option<Money>,
    /// When the code starts working
    pub start_date: GqlDateTime,
    /// When the code stops working
    pub end_date: GqlDateTime,
    pub notes: String,
    /// Whether the code can only be redeemed once
    pub single_use: bool,
    /// How many times the code has been redeemed
    pub used: i64,
    pub reason: String,
}

#[ComplexObject]
impl Discount {
    /// Whether the code can be redeemed at the given time (default: now)
    pub async fn is_valid(&self, at: Option<GqlDateTime>) -> bool {
        self.is_valid_at(at.map(|at| at.0).unwrap_or_else(now))
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code_name)
    }
}

impl Discount {
    /// Valid while `now` is within `[start_date, end_date]`, unless the code
    /// is single-use and has already been used.
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        if self.start_date.0 > now || self.end_date.0 < now {
            return false;
        }

        !self.single_use || self.used == 0
    }

    pub async fn with_id(id: i64, pool: &SqlitePool) -> Result<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| format!("No discount with id {}", id).into())
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM discounts WHERE id = ?",
            DISCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn with_code(code_name: &str, pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM discounts WHERE code_name = ? ORDER BY start_date, id",
            DISCOUNT_COLUMNS
        ))
        .bind(code_name)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM discounts ORDER BY code_name, id",
            DISCOUNT_COLUMNS
        ))
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn create(new_discount: NewDiscount, pool: &SqlitePool) -> Result<i64> {
        let id = sqlx::query(
            "INSERT INTO discounts (code_name, percent_off, amount_off, start_date, end_date,
                 notes, single_use, used, reason)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_discount.code_name)
        .bind(new_discount.percent_off)
        .bind(new_discount.amount_off)
        .bind(new_discount.start_date)
        .bind(new_discount.end_date)
        .bind(&new_discount.notes)
        .bind(new_discount.single_use)
        .bind(new_discount.used)
        .bind(&new_discount.reason)
        .execute(pool)
        .await?
        .last_insert_rowid();
        info!(id, code = %new_discount.code_name, "created discount");

        Ok(id)
    }

    pub async fn update(id: i64, update: NewDiscount, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query(
            "UPDATE discounts SET code_name = ?, percent_off = ?, amount_off = ?, start_date = ?,
                 end_date = ?, notes = ?, single_use = ?, used = ?, reason = ?
             WHERE id = ?",
        )
        .bind(&update.code_name)
        .bind(update.percent_off)
        .bind(update.amount_off)
        .bind(update.start_date)
        .bind(update.end_date)
        .bind(&update.notes)
        .bind(update.single_use)
        .bind(update.used)
        .bind(&update.reason)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn delete(id: i64, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM discounts WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        info!(id, "deleted discount");

        Ok(())
    }

    /// Counts one use of the discount if it is valid at `now`.
    ///
    /// The increment only lands if nobody else redeemed the code in between,
    /// so a single-use code can never be used twice.
    pub async fn redeem(id: i64, now: OffsetDateTime, pool: &SqlitePool) -> Result<Self> {
        let discount = Self::with_id(id, pool).await?;
        if !discount.is_valid_at(now) {
            warn!(id, code = %discount.code_name, "rejected redemption of invalid discount");
            return Err(format!("Discount {} is not valid", discount.code_name).into());
        }

        let updated = sqlx::query("UPDATE discounts SET used = used + 1 WHERE id = ? AND used = ?")
            .bind(id)
            .bind(discount.used)
            .execute(pool)
            .await?
            .rows_affected();
        if updated == 0 {
            warn!(id, code = %discount.code_name, "discount was redeemed concurrently");
            return Err(
                format!("Discount {} was just redeemed, try again", discount.code_name).into(),
            );
        }
        info!(id, code = %discount.code_name, "redeemed discount");

        Self::with_id(id, pool).await
    }
}

/// Both `percent_off` and `amount_off` may be set at once; neither is required.
#[derive(InputObject, Clone)]
pub struct NewDiscount {
    pub code_name: String,
    pub percent_off: Option<i32>,
    pub amount_off: Option<Money>,
    pub start_date: GqlDateTime,
    pub end_date: GqlDateTime,
    #[graphql(default)]
    pub notes: String,
    #[graphql(default)]
    pub single_use: bool,
    #[graphql(default)]
    pub used: i64,
    #[graphql(default)]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::db::test_pool;
    use crate::tests::mock::mock_discount;

    fn discount(single_use: bool, used: i64) -> Discount {
        Discount {
            id: 1,
            code_name: "EARLYBIRD".to_owned(),
            percent_off: Some(10),
            amount_off: None,
            start_date: datetime!(2024-01-01 00:00 UTC).into(),
            end_date: datetime!(2024-12-31 00:00 UTC).into(),
            notes: String::new(),
            single_use,
            used,
            reason: String::new(),
        }
    }

    #[test]
    fn valid_within_window() {
        let single = discount(true, 0);

        assert!(single.is_valid_at(datetime!(2024-06-01 00:00 UTC)));
        assert!(!single.is_valid_at(datetime!(2025-01-01 00:00 UTC)));
        assert!(!single.is_valid_at(datetime!(2023-12-31 23:59 UTC)));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let reusable = discount(false, 7);

        assert!(reusable.is_valid_at(datetime!(2024-01-01 00:00 UTC)));
        assert!(reusable.is_valid_at(datetime!(2024-12-31 00:00 UTC)));
        assert!(!reusable.is_valid_at(datetime!(2024-12-31 00:00:01 UTC)));
    }

    #[test]
    fn used_single_use_code_is_invalid() {
        assert!(!discount(true, 1).is_valid_at(datetime!(2024-06-01 00:00 UTC)));
        assert!(discount(false, 1).is_valid_at(datetime!(2024-06-01 00:00 UTC)));
        assert!(!discount(true, 1).is_valid_at(datetime!(2025-01-01 00:00 UTC)));
    }

    #[test]
    fn displays_as_its_code() {
        assert_eq!(discount(false, 0).to_string(), "EARLYBIRD");
    }

    #[tokio::test]
    async fn single_use_code_redeems_once() {
        let pool = test_pool().await;
        let id = Discount::create(mock_discount(true), &pool).await.unwrap();
        let during = datetime!(2024-06-01 00:00 UTC);

        let redeemed = Discount::redeem(id, during, &pool).await.unwrap();
        assert_eq!(redeemed.used, 1);
        assert!(!redeemed.is_valid_at(during));

        assert!(Discount::redeem(id, during, &pool).await.is_err());
        assert_eq!(Discount::with_id(id, &pool).await.unwrap().used, 1);
    }

    #[tokio::test]
    async fn reusable_code_keeps_counting() {
        let pool = test_pool().await;
        let id = Discount::create(mock_discount(false), &pool).await.unwrap();
        let during = datetime!(2024-06-01 00:00 UTC);

        for _ in 0..3 {
            Discount::redeem(id, during, &pool).await.unwrap();
        }

        let discount = Discount::with_id(id, &pool).await.unwrap();
        assert_eq!(discount.used, 3);
        assert!(discount.is_valid_at(during));
    }

    #[tokio::test]
    async fn expired_code_is_not_redeemed() {
        let pool = test_pool().await;
        let id = Discount::create(mock_discount(false), &pool).await.unwrap();

        let error = Discount::redeem(id, datetime!(2025-01-01 00:00 UTC), &pool)
            .await
            .unwrap_err();
        assert_eq!(error.message, "Discount EARLYBIRD is not valid");
        assert_eq!(Discount::with_id(id, &pool).await.unwrap().used, 0);
    }

    #[tokio::test]
    async fn negative_use_counts_are_rejected() {
        let pool = test_pool().await;

        let negative = NewDiscount {
            used: -1,
            ..mock_discount(true)
        };
        assert!(Discount::create(negative.clone(), &pool).await.is_err());
        assert!(Discount::all(&pool).await.unwrap().is_empty());

        let id = Discount::create(mock_discount(true), &pool).await.unwrap();
        assert!(Discount::update(id, negative, &pool).await.is_err());
        assert_eq!(Discount::with_id(id, &pool).await.unwrap().used, 0);
    }

    #[test]
    fn single_use_code_is_valid_only_before_first_use() {
        let during = datetime!(2024-06-01 00:00 UTC);

        assert!(discount(true, 0).is_valid_at(during));
        assert!(!discount(true, -1).is_valid_at(during));
    }

    #[tokio::test]
    async fn both_kinds_of_discount_can_be_set() {
        let pool = test_pool().await;
        let id = Discount::create(
            NewDiscount {
                percent_off: Some(15),
                amount_off: Some(Money::from_cents(500)),
                ..mock_discount(false)
            },
            &pool,
        )
        .await
        .unwrap();

        let discount = Discount::with_id(id, &pool).await.unwrap();
        assert_eq!(discount.percent_off, Some(15));
        assert_eq!(discount.amount_off, Some(Money::from_cents(500)));
        assert_eq!(Discount::with_code("EARLYBIRD", &pool).await.unwrap().len(), 1);
    }
}
