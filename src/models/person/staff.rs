use std::fmt;

use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use tracing::{debug, info};

use crate::db::pool_from_ctx;
use crate::models::department::Department;
use crate::models::emergency_contact::{ContactOwnerKind, EmergencyContact};
use crate::models::person::{
    NewPerson, Person, SqliteQuery, PERSON_ASSIGNMENTS, PERSON_COLUMNS, PERSON_PLACEHOLDERS,
};

const STAFF_COLUMNS: &str = "department_id, supervisor_id, needs_room, special_skills, checked_in,
    diet_restrictions, department_head";

/// A volunteer working the convention
#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Staff {
    /// The ID of the staff member
    pub id: i64,
    pub person: Person,
    /// The department the staff member works in
    pub department_id: i64,
    /// Who the staff member reports to. Top-level staff report to themselves.
    pub supervisor_id: i64,
    /// Whether the staff member needs a hotel room
    pub needs_room: bool,
    pub special_skills: String,
    /// Whether the staff member has picked up their badge
    pub checked_in: bool,
    pub diet_restrictions: String,
    /// Whether the staff member runs their department
    pub department_head: bool,
}

impl<'r> FromRow<'r, SqliteRow> for Staff {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Staff {
            id: row.try_get("id")?,
            person: Person::from_row(row)?,
            department_id: row.try_get("department_id")?,
            supervisor_id: row.try_get("supervisor_id")?,
            needs_room: row.try_get("needs_room")?,
            special_skills: row.try_get("special_skills")?,
            checked_in: row.try_get("checked_in")?,
            diet_restrictions: row.try_get("diet_restrictions")?,
            department_head: row.try_get("department_head")?,
        })
    }
}

#[ComplexObject]
impl Staff {
    #[graphql(name = "fullName")]
    pub async fn resolve_full_name(&self) -> String {
        self.full_name()
    }

    pub async fn department(&self, ctx: &Context<'_>) -> Result<Department> {
        Department::with_id(self.department_id, pool_from_ctx(ctx)).await
    }

    /// Who this staff member reports to
    pub async fn supervisor(&self, ctx: &Context<'_>) -> Result<Staff> {
        Staff::with_id(self.supervisor_id, pool_from_ctx(ctx)).await
    }

    /// The staff members who report to this one, not counting themself
    pub async fn reports(&self, ctx: &Context<'_>) -> Result<Vec<Staff>> {
        Staff::supervised_by(self.id, pool_from_ctx(ctx)).await
    }

    pub async fn emergency_contacts(&self, ctx: &Context<'_>) -> Result<Vec<EmergencyContact>> {
        EmergencyContact::for_owner(ContactOwnerKind::Staff, self.id, pool_from_ctx(ctx)).await
    }

    /// Whether the staff member reports to nobody else
    pub async fn top_level(&self) -> bool {
        self.is_top_level()
    }
}

impl fmt::Display for Staff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.person.fmt(f)
    }
}

impl Staff {
    pub fn full_name(&self) -> String {
        self.person.full_name()
    }

    pub fn is_top_level(&self) -> bool {
        self.supervisor_id == self.id
    }

    fn select(filter: &str) -> String {
        format!(
            "SELECT id, {}, {} FROM staff {}",
            PERSON_COLUMNS, STAFF_COLUMNS, filter
        )
    }

    pub async fn with_id(id: i64, pool: &SqlitePool) -> Result<Self> {
        Self::with_id_opt(id, pool)
            .await?
            .ok_or_else(|| format!("No staff member with id {}", id).into())
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

    pub async fn in_department(department_id: i64, pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&Self::select(
            "WHERE department_id = ? ORDER BY last_name, first_name, id",
        ))
        .bind(department_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn supervised_by(supervisor_id: i64, pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&Self::select(
            "WHERE supervisor_id = ? AND id != ? ORDER BY last_name, first_name, id",
        ))
        .bind(supervisor_id)
        .bind(supervisor_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    async fn check_references(
        department_id: i64,
        supervisor_id: Option<i64>,
        pool: &SqlitePool,
    ) -> Result<()> {
        Department::with_id(department_id, pool).await?;
        if let Some(supervisor_id) = supervisor_id {
            if Self::with_id_opt(supervisor_id, pool).await?.is_none() {
                debug!(supervisor_id, "staff supervisor not found");
                return Err(format!("No supervisor with id {}", supervisor_id).into());
            }
        }

        Ok(())
    }

    /// Creates a staff member. Without a supervisor, the new staff member
    /// supervises themself.
    pub async fn create(new_staff: NewStaff, pool: &SqlitePool) -> Result<i64> {
        new_staff.person.validate()?;
        Self::check_references(new_staff.department_id, new_staff.supervisor_id, pool).await?;

        let sql = format!(
            "INSERT INTO staff ({}, {}) VALUES ({}, ?, ?, ?, ?, ?, ?, ?)",
            PERSON_COLUMNS, STAFF_COLUMNS, PERSON_PLACEHOLDERS
        );

        // supervisor_id is checked at commit, so a top-level row can be
        // pointed at itself once its id is known.
        let mut transaction = pool.begin().await?;
        let id = new_staff
            .bind_to(
                new_staff.person.bind_to(sqlx::query(&sql)),
                new_staff.supervisor_id.unwrap_or(0),
            )
            .execute(&mut transaction)
            .await?
            .last_insert_rowid();
        if new_staff.supervisor_id.is_none() {
            sqlx::query("UPDATE staff SET supervisor_id = id WHERE id = ?")
                .bind(id)
                .execute(&mut transaction)
                .await?;
        }
        transaction.commit().await?;

        info!(
            id,
            department_id = new_staff.department_id,
            supervisor_id = new_staff.supervisor_id.unwrap_or(id),
            "created staff member"
        );

        Ok(id)
    }

    /// Replaces every field. Without a supervisor, the staff member becomes
    /// top-level.
    pub async fn update(id: i64, update: NewStaff, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;
        update.person.validate()?;
        Self::check_references(update.department_id, update.supervisor_id, pool).await?;

        let sql = format!(
            "UPDATE staff SET {}, department_id = ?, supervisor_id = ?, needs_room = ?,
                 special_skills = ?, checked_in = ?, diet_restrictions = ?, department_head = ?
             WHERE id = ?",
            PERSON_ASSIGNMENTS
        );
        update
            .bind_to(
                update.person.bind_to(sqlx::query(&sql)),
                update.supervisor_id.unwrap_or(id),
            )
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Also deletes everyone the staff member supervises, all the way down.
    pub async fn delete(id: i64, pool: &SqlitePool) -> Result<()> {
        Self::with_id(id, pool).await?;

        sqlx::query("DELETE FROM staff WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        info!(id, "deleted staff member");

        Ok(())
    }
}

#[derive(InputObject, Clone)]
pub struct NewStaff {
    pub person: NewPerson,
    pub department_id: i64,
    /// Leave empty for a top-level staff member
    pub supervisor_id: Option<i64>,
    pub needs_room: bool,
    #[graphql(default)]
    pub special_skills: String,
    #[graphql(default)]
    pub checked_in: bool,
    #[graphql(default)]
    pub diet_restrictions: String,
    #[graphql(default)]
    pub department_head: bool,
}

impl NewStaff {
    fn bind_to<'q>(&'q self, query: SqliteQuery<'q>, supervisor_id: i64) -> SqliteQuery<'q> {
        query
            .bind(self.department_id)
            .bind(supervisor_id)
            .bind(self.needs_room)
            .bind(&self.special_skills)
            .bind(self.checked_in)
            .bind(&self.diet_restrictions)
            .bind(self.department_head)
    }
}
