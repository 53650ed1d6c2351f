use async_graphql::{Context, Object, Result};

use crate::admin::EntityKind;
use crate::db::pool_from_ctx;
use crate::file::{FileUpload, MediaStore, UploadField};
use crate::graphql::guards::AdminAccess;
use crate::graphql::SUCCESS_MESSAGE;
use crate::models::charity::{Charity, NewCharity};
use crate::models::department::{Department, NewDepartment};
use crate::models::discount::{Discount, NewDiscount};
use crate::models::emergency_contact::{EmergencyContact, NewEmergencyContact};
use crate::models::event::{Event, NewEvent};
use crate::models::merchandise::{
    Merchandise, NewMerchandise, NewPriceLevelOption, PriceLevelOption,
};
use crate::models::person::attendee::{Attendee, NewAttendee};
use crate::models::person::staff::{NewStaff, Staff};
use crate::util::now;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    #[graphql(guard = "AdminAccess::create(EntityKind::Event)")]
    pub async fn create_event(&self, ctx: &Context<'_>, new_event: NewEvent) -> Result<Event> {
        let pool = pool_from_ctx(ctx);
        let id = Event::create(new_event, pool).await?;

        Event::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::update(EntityKind::Event)")]
    pub async fn update_event(
        &self,
        ctx: &Context<'_>,
        id: i64,
        new_event: NewEvent,
    ) -> Result<Event> {
        let pool = pool_from_ctx(ctx);
        Event::update(id, new_event, pool).await?;

        Event::with_id(id, pool).await
    }

    /// Stores a new code of conduct for the event, or removes it
    #[graphql(guard = "AdminAccess::update(EntityKind::Event)")]
    pub async fn set_event_code_of_conduct(
        &self,
        ctx: &Context<'_>,
        id: i64,
        file: Option<FileUpload>,
    ) -> Result<Event> {
        let pool = pool_from_ctx(ctx);
        let media = MediaStore::from_ctx(ctx);

        let stored = match file {
            Some(file) => Some(media.save(UploadField::CodeOfConduct, &file, now().date())?),
            None => None,
        };
        if let Err(err) = Event::set_code_of_conduct(id, stored.as_deref(), pool).await {
            if let Some(stored) = &stored {
                media.remove(stored);
            }
            return Err(err);
        }

        Event::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::delete(EntityKind::Event)")]
    pub async fn delete_event(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        Event::delete(id, pool_from_ctx(ctx)).await?;

        Ok(SUCCESS_MESSAGE)
    }

    #[graphql(guard = "AdminAccess::create(EntityKind::Charity)")]
    pub async fn create_charity(
        &self,
        ctx: &Context<'_>,
        new_charity: NewCharity,
    ) -> Result<Charity> {
        let pool = pool_from_ctx(ctx);
        let id = Charity::create(new_charity, pool).await?;

        Charity::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::update(EntityKind::Charity)")]
    pub async fn update_charity(
        &self,
        ctx: &Context<'_>,
        id: i64,
        new_charity: NewCharity,
    ) -> Result<Charity> {
        let pool = pool_from_ctx(ctx);
        Charity::update(id, new_charity, pool).await?;

        Charity::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::delete(EntityKind::Charity)")]
    pub async fn delete_charity(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        Charity::delete(id, pool_from_ctx(ctx)).await?;

        Ok(SUCCESS_MESSAGE)
    }

    #[graphql(guard = "AdminAccess::create(EntityKind::PriceLevelOption)")]
    pub async fn create_price_level_option(
        &self,
        ctx: &Context<'_>,
        new_option: NewPriceLevelOption,
    ) -> Result<PriceLevelOption> {
        let pool = pool_from_ctx(ctx);
        let id = PriceLevelOption::create(new_option, pool).await?;

        PriceLevelOption::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::update(EntityKind::PriceLevelOption)")]
    pub async fn update_price_level_option(
        &self,
        ctx: &Context<'_>,
        id: i64,
        new_option: NewPriceLevelOption,
    ) -> Result<PriceLevelOption> {
        let pool = pool_from_ctx(ctx);
        PriceLevelOption::update(id, new_option, pool).await?;

        PriceLevelOption::with_id(id, pool).await
    }

    /// Stores a new image for the option, or removes it
    #[graphql(guard = "AdminAccess::update(EntityKind::PriceLevelOption)")]
    pub async fn set_option_image(
        &self,
        ctx: &Context<'_>,
        id: i64,
        file: Option<FileUpload>,
    ) -> Result<PriceLevelOption> {
        let pool = pool_from_ctx(ctx);
        let media = MediaStore::from_ctx(ctx);

        let stored = match file {
            Some(file) => Some(media.save(UploadField::OptionImage, &file, now().date())?),
            None => None,
        };
        if let Err(err) = PriceLevelOption::set_option_image(id, stored.as_deref(), pool).await {
            if let Some(stored) = &stored {
                media.remove(stored);
            }
            return Err(err);
        }

        PriceLevelOption::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::delete(EntityKind::PriceLevelOption)")]
    pub async fn delete_price_level_option(
        &self,
        ctx: &Context<'_>,
        id: i64,
    ) -> Result<&'static str> {
        PriceLevelOption::delete(id, pool_from_ctx(ctx)).await?;

        Ok(SUCCESS_MESSAGE)
    }

    #[graphql(guard = "AdminAccess::create(EntityKind::Merchandise)")]
    pub async fn create_merchandise(
        &self,
        ctx: &Context<'_>,
        new_merchandise: NewMerchandise,
    ) -> Result<Merchandise> {
        let pool = pool_from_ctx(ctx);
        let id = Merchandise::create(new_merchandise, pool).await?;

        Merchandise::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::update(EntityKind::Merchandise)")]
    pub async fn update_merchandise(
        &self,
        ctx: &Context<'_>,
        id: i64,
        new_merchandise: NewMerchandise,
    ) -> Result<Merchandise> {
        let pool = pool_from_ctx(ctx);
        Merchandise::update(id, new_merchandise, pool).await?;

        Merchandise::with_id(id, pool).await
    }

    /// Deletes the item and all of its price level options
    #[graphql(guard = "AdminAccess::delete(EntityKind::Merchandise)")]
    pub async fn delete_merchandise(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        Merchandise::delete(id, pool_from_ctx(ctx)).await?;

        Ok(SUCCESS_MESSAGE)
    }

    #[graphql(guard = "AdminAccess::create(EntityKind::Discount)")]
    pub async fn create_discount(
        &self,
        ctx: &Context<'_>,
        new_discount: NewDiscount,
    ) -> Result<Discount> {
        let pool = pool_from_ctx(ctx);
        let id = Discount::create(new_discount, pool).await?;

        Discount::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::update(EntityKind::Discount)")]
    pub async fn update_discount(
        &self,
        ctx: &Context<'_>,
        id: i64,
        new_discount: NewDiscount,
    ) -> Result<Discount> {
        let pool = pool_from_ctx(ctx);
        Discount::update(id, new_discount, pool).await?;

        Discount::with_id(id, pool).await
    }

    /// Applies the discount once, failing if it is not currently valid
    #[graphql(guard = "AdminAccess::update(EntityKind::Discount)")]
    pub async fn redeem_discount(&self, ctx: &Context<'_>, id: i64) -> Result<Discount> {
        Discount::redeem(id, now(), pool_from_ctx(ctx)).await
    }

    #[graphql(guard = "AdminAccess::delete(EntityKind::Discount)")]
    pub async fn delete_discount(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        Discount::delete(id, pool_from_ctx(ctx)).await?;

        Ok(SUCCESS_MESSAGE)
    }

    #[graphql(guard = "AdminAccess::create(EntityKind::Department)")]
    pub async fn create_department(
        &self,
        ctx: &Context<'_>,
        new_department: NewDepartment,
    ) -> Result<Department> {
        let pool = pool_from_ctx(ctx);
        let id = Department::create(new_department, pool).await?;

        Department::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::update(EntityKind::Department)")]
    pub async fn update_department(
        &self,
        ctx: &Context<'_>,
        id: i64,
        new_department: NewDepartment,
    ) -> Result<Department> {
        let pool = pool_from_ctx(ctx);
        Department::update(id, new_department, pool).await?;

        Department::with_id(id, pool).await
    }

    /// Deletes the department and every staff member in it
    #[graphql(guard = "AdminAccess::delete(EntityKind::Department)")]
    pub async fn delete_department(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        Department::delete(id, pool_from_ctx(ctx)).await?;

        Ok(SUCCESS_MESSAGE)
    }

    /// Leave `supervisorId` empty to create a top-level staff member
    #[graphql(guard = "AdminAccess::create(EntityKind::Staff)")]
    pub async fn create_staff(&self, ctx: &Context<'_>, new_staff: NewStaff) -> Result<Staff> {
        let pool = pool_from_ctx(ctx);
        let id = Staff::create(new_staff, pool).await?;

        Staff::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::update(EntityKind::Staff)")]
    pub async fn update_staff(
        &self,
        ctx: &Context<'_>,
        id: i64,
        new_staff: NewStaff,
    ) -> Result<Staff> {
        let pool = pool_from_ctx(ctx);
        Staff::update(id, new_staff, pool).await?;

        Staff::with_id(id, pool).await
    }

    /// Deletes the staff member and everyone who reports to them
    #[graphql(guard = "AdminAccess::delete(EntityKind::Staff)")]
    pub async fn delete_staff(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        Staff::delete(id, pool_from_ctx(ctx)).await?;

        Ok(SUCCESS_MESSAGE)
    }

    #[graphql(guard = "AdminAccess::create(EntityKind::Attendee)")]
    pub async fn create_attendee(
        &self,
        ctx: &Context<'_>,
        new_attendee: NewAttendee,
    ) -> Result<Attendee> {
        let pool = pool_from_ctx(ctx);
        let id = Attendee::create(new_attendee, pool).await?;

        Attendee::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::update(EntityKind::Attendee)")]
    pub async fn update_attendee(
        &self,
        ctx: &Context<'_>,
        id: i64,
        new_attendee: NewAttendee,
    ) -> Result<Attendee> {
        let pool = pool_from_ctx(ctx);
        Attendee::update(id, new_attendee, pool).await?;

        Attendee::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::delete(EntityKind::Attendee)")]
    pub async fn delete_attendee(&self, ctx: &Context<'_>, id: i64) -> Result<&'static str> {
        Attendee::delete(id, pool_from_ctx(ctx)).await?;

        Ok(SUCCESS_MESSAGE)
    }

    #[graphql(guard = "AdminAccess::create(EntityKind::EmergencyContact)")]
    pub async fn create_emergency_contact(
        &self,
        ctx: &Context<'_>,
        new_contact: NewEmergencyContact,
    ) -> Result<EmergencyContact> {
        let pool = pool_from_ctx(ctx);
        let id = EmergencyContact::create(new_contact, pool).await?;

        EmergencyContact::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::update(EntityKind::EmergencyContact)")]
    pub async fn update_emergency_contact(
        &self,
        ctx: &Context<'_>,
        id: i64,
        new_contact: NewEmergencyContact,
    ) -> Result<EmergencyContact> {
        let pool = pool_from_ctx(ctx);
        EmergencyContact::update(id, new_contact, pool).await?;

        EmergencyContact::with_id(id, pool).await
    }

    #[graphql(guard = "AdminAccess::delete(EntityKind::EmergencyContact)")]
    pub async fn delete_emergency_contact(
        &self,
        ctx: &Context<'_>,
        id: i64,
    ) -> Result<&'static str> {
        EmergencyContact::delete(id, pool_from_ctx(ctx)).await?;

        Ok(SUCCESS_MESSAGE)
    }
}
