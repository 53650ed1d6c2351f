use std::fmt;

use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use tracing::info;

use crate::db::pool_from_ctx;
use crate::models::emergency_contact::{
    ContactOwnerKind, EmergencyContact, PLACEHOLDER_PHONE_NUMBER,
};
use crate::models::person::{
    NewPerson, Person, SqliteQuery, PERSON_ASSIGNMENTS, PERSON_COLUMNS, PERSON_PLACEHOLDERS,
};
use crate::models::CountryCode;

const ATTENDEE_COLUMNS: &str = "address1, address2, zip_code, city, state, country, phone_number,
    agrees_to_surveys, request_volunteer_info, request_asl";

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Attendee {
    /// The ID of the attendee
    pub id: i64,
    /// Details shared with staff members
    pub person: Person,
    /// Address line 1
    pub address1: String,
    /// Address line 2
    pub address2: String,
    /// ZIP / Postal code
    pub zip_code: String,
    pub city: String,
    pub state: String,
    pub country: CountryCode,
    pub phone_number: String,
    /// Whether the attendee agreed to receive surveys
    pub agrees_to_surveys: bool,
    /// Whether the attendee wants information about volunteering
    pub request_volunteer_info: bool,
    /// Whether the attendee requested ASL accommodation
    pub request_asl: bool,
}

impl<'r> FromRow<'r, SqliteRow> for Attendee {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Attendee {
            id: row.try_get("id")?,
            person: Person::from_row(row)?,
            address1: row.try_get("address1")?,
            address2: row.try_get("address2")?,
            zip_code: row.try_get("zip_code")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            country: row.try_get("country")?,
            phone_number: row.try_get("phone_number")?,
            agrees_to_surveys: row.try_get("agrees_to_surveys")?,
            request_volunteer_info: row.try_get("request_volunteer_info")?,
            request_asl: row.try_get("request_asl")?,
        })
    }
}

#[ComplexObject]
impl Attendee {
    /// The attendee's first and last name
    #[graphql(name = "fullName")]
    pub async fn resolve_full_name(&self) -> String {
        self.full_name()
    }

    /// Who to call in an emergency
    pub async fn emergency_contacts(&self, ctx: &Context<'_>) -> Result<Vec<EmergencyContact>> {
        EmergencyContact::for_owner(ContactOwnerKind::Attendee, self.id, pool_from_ctx(ctx)).await
    }
}

impl fmt::Display for Attendee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.person.fmt(f)
    }
}

impl Attendee {
    pub fn full_name(&self) -> String {
        self.person.full_name()
    }

    fn select(filter: &str) -> String {
        format!(
            "SELECT id, {}, {} FROM attendees {}",
            PERSON_COLUMNS, ATTENDEE_COLUMNS, filter
        )
    }

    pub async fn with_id(id: i64, pool: &SqlitePool) -> Result<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| format!("No attendee with id {}", id).into())
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(&Self::select("WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&Self::select("ORDER BY last_name, first_name, id"))
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn create(new_attendee: NewAttendee, pool: &SqlitePool) -> Result<i64> {
        new_attendee.person.validate()?;

        let sql = format!(
            "INSERT INTO attendees ({}, {}) VALUES ({}, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            PERSON_COLUMNS, ATTENDEE_COLUMNS, PERSON_PLACEHOLDERS
        );
        let id = new_attendee
            .bind_to(new_attendee.person.bind_to(sqlx::query(&sql)))
            .execute(pool)
            .await?
            .last_insert_rowid();
        info!(id, "registered attendee");

        Ok(id)
    }

    pub async fn update(id: i64, update: NewAttendee, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;
        update.person.validate()?;

        let sql = format!(
            "UPDATE attendees SET {}, address1 = ?, address2 = ?, zip_code = ?, city = ?,
                 state = ?, country = ?, phone_number = ?, agrees_to_surveys = ?,
                 request_volunteer_info = ?, request_asl = ?
             WHERE id = ?",
            PERSON_ASSIGNMENTS
        );
        update
            .bind_to(update.person.bind_to(sqlx::query(&sql)))
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Also deletes the attendee's emergency contacts.
    pub async fn delete(id: i64, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM attendees WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        info!(id, "deleted attendee");

        Ok(())
    }
}

#[derive(InputObject, Clone)]
pub struct NewAttendee {
    pub person: NewPerson,
    pub address1: String,
    pub address2: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
    pub country: CountryCode,
    #[graphql(default_with = "PLACEHOLDER_PHONE_NUMBER.to_owned()")]
    pub phone_number: String,
    pub agrees_to_surveys: bool,
    pub request_volunteer_info: bool,
    pub request_asl: bool,
}

impl NewAttendee {
    fn bind_to<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.address1)
            .bind(&self.address2)
            .bind(&self.zip_code)
            .bind(&self.city)
            .bind(&self.state)
            .bind(&self.country)
            .bind(&self.phone_number)
            .bind(self.agrees_to_surveys)
            .bind(self.request_volunteer_info)
            .bind(self.request_asl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::tests::mock::mock_attendee;

    #[tokio::test]
    async fn register_and_fetch() {
        let pool = test_pool().await;
        let id = Attendee::create(mock_attendee(), &pool).await.unwrap();

        let attendee = Attendee::with_id(id, &pool).await.unwrap();
        assert_eq!(attendee.full_name(), "Jane Doe");
        assert_eq!(attendee.to_string(), "Jane Doe");
        assert_eq!(attendee.country.as_str(), "US");
        assert_eq!(attendee.phone_number, PLACEHOLDER_PHONE_NUMBER);
        assert!(!attendee.person.is_banned);
    }

    #[tokio::test]
    async fn update_replaces_every_field() {
        let pool = test_pool().await;
        let id = Attendee::create(mock_attendee(), &pool).await.unwrap();

        let mut update = mock_attendee();
        update.person.is_banned = true;
        update.person.reason = "Harassment".to_owned();
        update.city = "Toronto".to_owned();
        update.country = CountryCode::new("CA").unwrap();
        Attendee::update(id, update, &pool).await.unwrap();

        let attendee = Attendee::with_id(id, &pool).await.unwrap();
        assert!(attendee.person.is_banned);
        assert_eq!(attendee.person.reason, "Harassment");
        assert_eq!(attendee.city, "Toronto");
        assert_eq!(attendee.country.as_str(), "CA");
    }

    #[tokio::test]
    async fn long_names_are_rejected() {
        let pool = test_pool().await;
        let mut attendee = mock_attendee();
        attendee.person.badge_name = "b".repeat(33);

        assert!(Attendee::create(attendee, &pool).await.is_err());
        assert!(Attendee::all(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let pool = test_pool().await;
        let mut attendee = mock_attendee();
        attendee.person.email = "definitely not an email".to_owned();

        let error = Attendee::create(attendee.clone(), &pool).await.unwrap_err();
        assert!(error.message.contains("not a valid email address"));
        assert!(Attendee::all(&pool).await.unwrap().is_empty());

        let id = Attendee::create(mock_attendee(), &pool).await.unwrap();
        assert!(Attendee::update(id, attendee, &pool).await.is_err());
        let stored = Attendee::with_id(id, &pool).await.unwrap();
        assert_eq!(stored.person.email, "jane@example.org");
    }

    #[tokio::test]
    async fn country_round_trips_as_iso_code() {
        let pool = test_pool().await;
        let mut attendee = mock_attendee();
        attendee.country = CountryCode::new("gb").unwrap();
        let id = Attendee::create(attendee, &pool).await.unwrap();

        assert_eq!(Attendee::with_id(id, &pool).await.unwrap().country.as_str(), "GB");
        assert!(CountryCode::new("ZZ").is_err());
    }
}
