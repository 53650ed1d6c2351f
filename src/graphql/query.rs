use async_graphql::{Context, Object, Result};

use crate::admin::{AdminManifest, EntityKind};
use crate::db::pool_from_ctx;
use crate::graphql::guards::AdminAccess;
use crate::models::charity::Charity;
use crate::models::department::Department;
use crate::models::discount::Discount;
use crate::models::emergency_contact::EmergencyContact;
use crate::models::event::Event;
use crate::models::merchandise::{Merchandise, PriceLevelOption};
use crate::models::person::attendee::Attendee;
use crate::models::person::staff::Staff;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The entities and operations available to admin screens
    pub async fn admin_manifest(&self, ctx: &Context<'_>) -> AdminManifest {
        ctx.data_opt::<AdminManifest>().cloned().unwrap_or_default()
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::Event)")]
    pub async fn event(&self, ctx: &Context<'_>, id: i64) -> Result<Event> {
        Event::with_id(id, pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::Event)")]
    pub async fn events(&self, ctx: &Context<'_>) -> Result<Vec<Event>> {
        Event::all(pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::Charity)")]
    pub async fn charity(&self, ctx: &Context<'_>, id: i64) -> Result<Charity> {
        Charity::with_id(id, pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::Charity)")]
    pub async fn charities(&self, ctx: &Context<'_>) -> Result<Vec<Charity>> {
        Charity::all(pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::PriceLevelOption)")]
    pub async fn price_level_option(&self, ctx: &Context<'_>, id: i64) -> Result<PriceLevelOption> {
        PriceLevelOption::with_id(id, pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::PriceLevelOption)")]
    pub async fn price_level_options(&self, ctx: &Context<'_>) -> Result<Vec<PriceLevelOption>> {
        PriceLevelOption::all(pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::Merchandise)")]
    pub async fn merchandise(&self, ctx: &Context<'_>, id: i64) -> Result<Merchandise> {
        Merchandise::with_id(id, pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::Merchandise)")]
    pub async fn all_merchandise(&self, ctx: &Context<'_>) -> Result<Vec<Merchandise>> {
        Merchandise::all(pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::Discount)")]
    pub async fn discount(&self, ctx: &Context<'_>, id: i64) -> Result<Discount> {
        Discount::with_id(id, pool_from_ctx(ctx)).await
    }

    /// All discounts, or only those with the given code
    #[graphql(guard = "AdminAccess::read(EntityKind::Discount)")]
    pub async fn discounts(&self, ctx: &Context<'_>, code: Option<String>) -> Result<Vec<Discount>> {
        let pool = pool_from_ctx(ctx);

        match code {
            Some(code) => Discount::with_code(&code, pool).await,
            None => Discount::all(pool).await,
        }
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::Department)")]
    pub async fn department(&self, ctx: &Context<'_>, id: i64) -> Result<Department> {
        Department::with_id(id, pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::Department)")]
    pub async fn departments(&self, ctx: &Context<'_>) -> Result<Vec<Department>> {
        Department::all(pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::Staff)")]
    pub async fn staff_member(&self, ctx: &Context<'_>, id: i64) -> Result<Staff> {
        Staff::with_id(id, pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::Staff)")]
    pub async fn staff(&self, ctx: &Context<'_>) -> Result<Vec<Staff>> {
        Staff::all(pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::Attendee)")]
    pub async fn attendee(&self, ctx: &Context<'_>, id: i64) -> Result<Attendee> {
        Attendee::with_id(id, pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::Attendee)")]
    pub async fn attendees(&self, ctx: &Context<'_>) -> Result<Vec<Attendee>> {
        Attendee::all(pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::EmergencyContact)")]
    pub async fn emergency_contact(&self, ctx: &Context<'_>, id: i64) -> Result<EmergencyContact> {
        EmergencyContact::with_id(id, pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::read(EntityKind::EmergencyContact)")]
    pub async fn emergency_contacts(&self, ctx: &Context<'_>) -> Result<Vec<EmergencyContact>> {
        EmergencyContact::all(pool_from_ctx(ctx)).await
    }
}
