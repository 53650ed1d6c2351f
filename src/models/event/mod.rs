use async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;

use crate::db::pool_from_ctx;
use crate::models::charity::Charity;
use crate::models::{GqlDate, GqlDateTime};
use crate::util::now;

const EVENT_COLUMNS: &str = "id, dealer_reg_start, dealer_reg_end, staff_reg_start, staff_reg_end,
    attendee_reg_start, attendee_reg_end, onsite_reg_start, onsite_reg_end, event_start,
    event_end, registration_email, staff_email, dealer_email, code_of_conduct, charity_id";

/// A single edition of the convention
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug)]
#[graphql(complex)]
pub struct Event {
    /// The ID of the event
    pub id: i64,
    /// Start date and time for dealer applications
    pub dealer_reg_start: GqlDateTime,
    /// Dealer Registration End
    pub dealer_reg_end: GqlDateTime,
    /// Staff Registration Start (not currently enforced)
    pub staff_reg_start: GqlDateTime,
    /// Staff Registration End
    pub staff_reg_end: GqlDateTime,
    /// Attendee Registration Start
    pub attendee_reg_start: GqlDateTime,
    /// Attendee Registration End
    pub attendee_reg_end: GqlDateTime,
    /// Start time for the on-site registration form
    pub onsite_reg_start: GqlDateTime,
    /// On-site Registration End
    pub onsite_reg_end: GqlDateTime,
    /// Event Start Date
    pub event_start: GqlDate,
    /// Event End Date
    pub event_end: GqlDate,
    /// Email to display on error messages for attendee registration
    pub registration_email: String,
    /// Email to display on error messages for staff registration
    pub staff_email: String,
    /// Email to display on error messages for dealer registration
    pub dealer_email: String,
    /// Where the code of conduct is stored, relative to the media root
    pub code_of_conduct: Option<String>,
    /// The ID of the charity this event supports, if any
    pub charity_id: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enum)]
pub enum RegistrationKind {
    Dealer,
    Staff,
    Attendee,
    Onsite,
}

/// A span of time during which a kind of registration is accepted
#[derive(SimpleObject, Clone, Copy, Debug)]
#[graphql(complex)]
pub struct RegistrationWindow {
    pub start: GqlDateTime,
    pub end: GqlDateTime,
}

impl RegistrationWindow {
    /// Inclusive at both ends.
    pub fn contains(&self, at: OffsetDateTime) -> bool {
        self.start.0 <= at && at <= self.end.0
    }
}

#[ComplexObject]
impl RegistrationWindow {
    /// Whether the window is open at the given time (default: now)
    pub async fn is_open(&self, at: Option<GqlDateTime>) -> bool {
        self.contains(at.map(|at| at.0).unwrap_or_else(now))
    }
}

#[ComplexObject]
impl Event {
    /// The charity this event supports, if any
    pub async fn charity(&self, ctx: &Context<'_>) -> Result<Option<Charity>> {
        match self.charity_id {
            Some(charity_id) => Charity::with_id_opt(charity_id, pool_from_ctx(ctx)).await,
            None => Ok(None),
        }
    }

    /// The start and end of one kind of registration
    pub async fn registration_window(&self, kind: RegistrationKind) -> RegistrationWindow {
        self.window(kind)
    }
}

impl Event {
    pub fn window(&self, kind: RegistrationKind) -> RegistrationWindow {
        let (start, end) = match kind {
            RegistrationKind::Dealer => (self.dealer_reg_start, self.dealer_reg_end),
            RegistrationKind::Staff => (self.staff_reg_start, self.staff_reg_end),
            RegistrationKind::Attendee => (self.attendee_reg_start, self.attendee_reg_end),
            RegistrationKind::Onsite => (self.onsite_reg_start, self.onsite_reg_end),
        };

        RegistrationWindow { start, end }
    }

    pub async fn with_id(id: i64, pool: &SqlitePool) -> Result<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| format!("No event with id {}", id).into())
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(&format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM events ORDER BY event_start, id",
            EVENT_COLUMNS
        ))
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn for_charity(charity_id: i64, pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM events WHERE charity_id = ? ORDER BY event_start, id",
            EVENT_COLUMNS
        ))
        .bind(charity_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn create(new_event: NewEvent, pool: &SqlitePool) -> Result<i64> {
        let id = sqlx::query(
            "INSERT INTO events (dealer_reg_start, dealer_reg_end, staff_reg_start, staff_reg_end,
                 attendee_reg_start, attendee_reg_end, onsite_reg_start, onsite_reg_end,
                 event_start, event_end, registration_email, staff_email, dealer_email,
                 charity_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_event.dealer_reg_start)
        .bind(new_event.dealer_reg_end)
        .bind(new_event.staff_reg_start)
        .bind(new_event.staff_reg_end)
        .bind(new_event.attendee_reg_start)
        .bind(new_event.attendee_reg_end)
        .bind(new_event.onsite_reg_start)
        .bind(new_event.onsite_reg_end)
        .bind(new_event.event_start)
        .bind(new_event.event_end)
        .bind(&new_event.registration_email)
        .bind(&new_event.staff_email)
        .bind(&new_event.dealer_email)
        .bind(new_event.charity_id)
        .execute(pool)
        .await?
        .last_insert_rowid();
        info!(id, "created event");

        Ok(id)
    }

    pub async fn update(id: i64, update: NewEvent, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query(
            "UPDATE events SET
                 dealer_reg_start = ?, dealer_reg_end = ?, staff_reg_start = ?, staff_reg_end = ?,
                 attendee_reg_start = ?, attendee_reg_end = ?, onsite_reg_start = ?,
                 onsite_reg_end = ?, event_start = ?, event_end = ?, registration_email = ?,
                 staff_email = ?, dealer_email = ?, charity_id = ?
             WHERE id = ?",
        )
        .bind(update.dealer_reg_start)
        .bind(update.dealer_reg_end)
        .bind(update.staff_reg_start)
        .bind(update.staff_reg_end)
        .bind(update.attendee_reg_start)
        .bind(update.attendee_reg_end)
        .bind(update.onsite_reg_start)
        .bind(update.onsite_reg_end)
        .bind(update.event_start)
        .bind(update.event_end)
        .bind(&update.registration_email)
        .bind(&update.staff_email)
        .bind(&update.dealer_email)
        .bind(update.charity_id)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn set_code_of_conduct(
        id: i64,
        code_of_conduct: Option<&str>,
        pool: &SqlitePool,
    ) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("UPDATE events SET code_of_conduct = ? WHERE id = ?")
            .bind(code_of_conduct)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn delete(id: i64, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        info!(id, "deleted event");

        Ok(())
    }
}

#[derive(InputObject, Clone)]
pub struct NewEvent {
    pub dealer_reg_start: GqlDateTime,
    pub dealer_reg_end: GqlDateTime,
    pub staff_reg_start: GqlDateTime,
    pub staff_reg_end: GqlDateTime,
    pub attendee_reg_start: GqlDateTime,
    pub attendee_reg_end: GqlDateTime,
    pub onsite_reg_start: GqlDateTime,
    pub onsite_reg_end: GqlDateTime,
    pub event_start: GqlDate,
    pub event_end: GqlDate,
    #[graphql(default)]
    pub registration_email: String,
    #[graphql(default)]
    pub staff_email: String,
    #[graphql(default)]
    pub dealer_email: String,
    pub charity_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::db::test_pool;
    use crate::tests::mock::{mock_charity, mock_event};

    #[tokio::test]
    async fn create_and_fetch() {
        let pool = test_pool().await;
        let id = Event::create(mock_event(None), &pool).await.unwrap();

        let event = Event::with_id(id, &pool).await.unwrap();
        assert_eq!(event.registration_email, "registration@example.org");
        assert_eq!(event.charity_id, None);
        assert_eq!(event.code_of_conduct, None);
        assert_eq!(
            event.attendee_reg_start.0,
            datetime!(2024-01-01 00:00 UTC)
        );
    }

    #[tokio::test]
    async fn unknown_charity_is_rejected() {
        let pool = test_pool().await;

        assert!(Event::create(mock_event(Some(99)), &pool).await.is_err());
    }

    #[tokio::test]
    async fn events_are_listed_per_charity() {
        let pool = test_pool().await;
        let charity = Charity::create(mock_charity(), &pool).await.unwrap();
        Event::create(mock_event(Some(charity)), &pool).await.unwrap();
        Event::create(mock_event(None), &pool).await.unwrap();

        assert_eq!(Event::for_charity(charity, &pool).await.unwrap().len(), 1);
        assert_eq!(Event::all(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn code_of_conduct_can_be_set_and_cleared() {
        let pool = test_pool().await;
        let id = Event::create(mock_event(None), &pool).await.unwrap();

        Event::set_code_of_conduct(id, Some("codes_of_conduct/2024/01/01/coc.pdf"), &pool)
            .await
            .unwrap();
        assert_eq!(
            Event::with_id(id, &pool).await.unwrap().code_of_conduct.as_deref(),
            Some("codes_of_conduct/2024/01/01/coc.pdf")
        );

        Event::set_code_of_conduct(id, None, &pool).await.unwrap();
        assert_eq!(Event::with_id(id, &pool).await.unwrap().code_of_conduct, None);
    }

    #[tokio::test]
    async fn registration_windows_are_inclusive() {
        let pool = test_pool().await;
        let id = Event::create(mock_event(None), &pool).await.unwrap();
        let window = Event::with_id(id, &pool)
            .await
            .unwrap()
            .window(RegistrationKind::Attendee);

        assert!(window.contains(datetime!(2024-01-01 00:00 UTC)));
        assert!(window.contains(datetime!(2024-05-01 12:00 UTC)));
        assert!(window.contains(datetime!(2024-06-30 23:59 UTC)));
        assert!(!window.contains(datetime!(2023-12-31 23:59 UTC)));
        assert!(!window.contains(datetime!(2024-07-01 00:00 UTC)));
    }
}
