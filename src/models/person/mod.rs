//! People who register for the event. Attendees and staff share the
//! [`Person`] field set, embedded by value in each.

use std::fmt;

use async_graphql::{ComplexObject, Enum, InputObject, Result, SimpleObject};
use regex::Regex;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use crate::models::GqlDate;

pub mod attendee;
pub mod staff;

pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Columns shared by every table that embeds a [`Person`], in binding order.
pub const PERSON_COLUMNS: &str = "first_name, last_name, badge_name, email, pronouns, shirt_size,
    birth_date, agrees_to_con_tos, delete_info, is_banned, reason";

pub const PERSON_PLACEHOLDERS: &str = "?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?";

pub const PERSON_ASSIGNMENTS: &str = "first_name = ?, last_name = ?, badge_name = ?, email = ?,
    pronouns = ?, shirt_size = ?, birth_date = ?, agrees_to_con_tos = ?, delete_info = ?,
    is_banned = ?, reason = ?";

#[derive(sqlx::Type, Clone, Copy, Debug, PartialEq, Eq, Enum)]
pub enum ShirtSize {
    #[sqlx(rename = "XS")]
    Xs,
    #[sqlx(rename = "SM")]
    Sm,
    #[sqlx(rename = "MD")]
    Md,
    #[sqlx(rename = "L")]
    L,
    #[sqlx(rename = "XL")]
    Xl,
    #[sqlx(rename = "XXL")]
    Xxl,
}

impl ShirtSize {
    pub fn label(&self) -> &'static str {
        match self {
            ShirtSize::Xs => "extra small",
            ShirtSize::Sm => "small",
            ShirtSize::Md => "medium",
            ShirtSize::L => "large",
            ShirtSize::Xl => "extra large",
            ShirtSize::Xxl => "extra extra large",
        }
    }
}

pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name, last_name)
}

#[derive(SimpleObject, sqlx::FromRow, Clone, Debug)]
#[graphql(complex)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    /// The name printed on the person's badge
    pub badge_name: String,
    pub email: String,
    pub pronouns: String,
    pub shirt_size: ShirtSize,
    pub birth_date: GqlDate,
    /// Whether the person agreed to the convention's terms of service
    pub agrees_to_con_tos: bool,
    /// Whether the person asked for their information to be deleted
    pub delete_info: bool,
    /// Whether the person is banned from the convention
    pub is_banned: bool,
    /// Why the person is banned
    pub reason: String,
}

#[ComplexObject]
impl Person {
    /// The person's first and last name
    #[graphql(name = "fullName")]
    pub async fn resolve_full_name(&self) -> String {
        self.full_name()
    }
}

impl Person {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

#[derive(InputObject, Clone)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
    pub badge_name: String,
    #[graphql(validator(email))]
    pub email: String,
    pub pronouns: String,
    pub shirt_size: ShirtSize,
    pub birth_date: GqlDate,
    pub agrees_to_con_tos: bool,
    #[graphql(default)]
    pub delete_info: bool,
    #[graphql(default)]
    pub is_banned: bool,
    #[graphql(default)]
    pub reason: String,
}

impl NewPerson {
    /// Rejects malformed email addresses before anything is written.
    pub fn validate(&self) -> Result<()> {
        let regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")?;

        if regex.is_match(&self.email) {
            Ok(())
        } else {
            Err(format!("{:?} is not a valid email address", self.email).into())
        }
    }

    /// Binds the shared fields in [`PERSON_COLUMNS`] order.
    pub fn bind_to<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.first_name)
            .bind(&self.last_name)
            .bind(&self.badge_name)
            .bind(&self.email)
            .bind(&self.pronouns)
            .bind(self.shirt_size)
            .bind(self.birth_date)
            .bind(self.agrees_to_con_tos)
            .bind(self.delete_info)
            .bind(self.is_banned)
            .bind(&self.reason)
    }
}
