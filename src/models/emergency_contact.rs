use std::fmt;

use async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject, Union};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::pool_from_ctx;
use crate::models::person::attendee::Attendee;
use crate::models::person::full_name;
use crate::models::person::staff::Staff;

pub const PLACEHOLDER_PHONE_NUMBER: &str = "XXXXXXXXXX";

const CONTACT_COLUMNS: &str =
    "id, first_name, last_name, relation, phone_number, owner_kind, owner_id";

/// Which kind of record an emergency contact is attached to
#[derive(sqlx::Type, Clone, Copy, Debug, PartialEq, Eq, Hash, Enum)]
pub enum ContactOwnerKind {
    #[sqlx(rename = "attendee")]
    Attendee,
    #[sqlx(rename = "staff")]
    Staff,
}

impl ContactOwnerKind {
    /// The table holding owners of this kind.
    pub fn table(&self) -> &'static str {
        match self {
            ContactOwnerKind::Attendee => "attendees",
            ContactOwnerKind::Staff => "staff",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactOwnerKind::Attendee => "attendee",
            ContactOwnerKind::Staff => "staff member",
        }
    }

    pub async fn owner_exists(&self, owner_id: i64, pool: &SqlitePool) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM {} WHERE id = ?",
            self.table()
        ))
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }
}

/// The record an emergency contact belongs to
#[derive(Union, Clone, Debug)]
pub enum ContactOwner {
    Attendee(Attendee),
    Staff(Staff),
}

impl ContactOwner {
    pub async fn resolve(
        kind: ContactOwnerKind,
        owner_id: i64,
        pool: &SqlitePool,
    ) -> Result<Option<Self>> {
        Ok(match kind {
            ContactOwnerKind::Attendee => Attendee::with_id_opt(owner_id, pool)
                .await?
                .map(ContactOwner::Attendee),
            ContactOwnerKind::Staff => Staff::with_id_opt(owner_id, pool)
                .await?
                .map(ContactOwner::Staff),
        })
    }

    pub fn kind(&self) -> ContactOwnerKind {
        match self {
            ContactOwner::Attendee(_) => ContactOwnerKind::Attendee,
            ContactOwner::Staff(_) => ContactOwnerKind::Staff,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            ContactOwner::Attendee(attendee) => attendee.id,
            ContactOwner::Staff(staff) => staff.id,
        }
    }
}

/// Someone to call if something happens to an attendee or staff member
#[derive(SimpleObject, sqlx::FromRow, Clone, Debug)]
#[graphql(complex)]
pub struct EmergencyContact {
    /// The ID of the contact
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// How the contact is related to the person
    pub relation: String,
    pub phone_number: String,
    /// What kind of record the contact is attached to
    pub owner_kind: ContactOwnerKind,
    /// The ID of the record the contact is attached to
    pub owner_id: i64,
}

#[ComplexObject]
impl EmergencyContact {
    /// The contact's first and last name
    #[graphql(name = "fullName")]
    pub async fn resolve_full_name(&self) -> String {
        self.full_name()
    }

    /// The attendee or staff member this contact belongs to
    pub async fn owner(&self, ctx: &Context<'_>) -> Result<Option<ContactOwner>> {
        ContactOwner::resolve(self.owner_kind, self.owner_id, pool_from_ctx(ctx)).await
    }
}

impl fmt::Display for EmergencyContact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

impl EmergencyContact {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }

    pub async fn with_id(id: i64, pool: &SqlitePool) -> Result<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| format!("No emergency contact with id {}", id).into())
    }

    pub async fn with_id_opt(id: i64, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM emergency_contacts WHERE id = ?",
            CONTACT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn all(pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM emergency_contacts ORDER BY last_name, first_name, id",
            CONTACT_COLUMNS
        ))
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn for_owner(
        kind: ContactOwnerKind,
        owner_id: i64,
        pool: &SqlitePool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM emergency_contacts WHERE owner_kind = ? AND owner_id = ? ORDER BY id",
            CONTACT_COLUMNS
        ))
        .bind(kind)
        .bind(owner_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    async fn ensure_owner_exists(
        kind: ContactOwnerKind,
        owner_id: i64,
        pool: &SqlitePool,
    ) -> Result<()> {
        if kind.owner_exists(owner_id, pool).await? {
            Ok(())
        } else {
            debug!(?kind, owner_id, "emergency contact owner not found");
            Err(format!("No {} with id {}", kind.label(), owner_id).into())
        }
    }

    pub async fn create(new_contact: NewEmergencyContact, pool: &SqlitePool) -> Result<i64> {
        Self::ensure_owner_exists(new_contact.owner_kind, new_contact.owner_id, pool).await?;

        let id = sqlx::query(
            "INSERT INTO emergency_contacts (first_name, last_name, relation, phone_number,
                 owner_kind, owner_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_contact.first_name)
        .bind(&new_contact.last_name)
        .bind(&new_contact.relation)
        .bind(&new_contact.phone_number)
        .bind(new_contact.owner_kind)
        .bind(new_contact.owner_id)
        .execute(pool)
        .await?
        .last_insert_rowid();
        info!(
            id,
            owner_kind = ?new_contact.owner_kind,
            owner_id = new_contact.owner_id,
            "created emergency contact"
        );

        Ok(id)
    }

    pub async fn update(id: i64, update: NewEmergencyContact, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;
        Self::ensure_owner_exists(update.owner_kind, update.owner_id, pool).await?;

        sqlx::query(
            "UPDATE emergency_contacts SET first_name = ?, last_name = ?, relation = ?,
                 phone_number = ?, owner_kind = ?, owner_id = ?
             WHERE id = ?",
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.relation)
        .bind(&update.phone_number)
        .bind(update.owner_kind)
        .bind(update.owner_id)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn delete(id: i64, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM emergency_contacts WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        info!(id, "deleted emergency contact");

        Ok(())
    }
}

#[derive(InputObject, Clone)]
pub struct NewEmergencyContact {
    pub first_name: String,
    pub last_name: String,
    pub relation: String,
    #[graphql(default_with = "PLACEHOLDER_PHONE_NUMBER.to_owned()")]
    pub phone_number: String,
    pub owner_kind: ContactOwnerKind,
    pub owner_id: i64,
}
