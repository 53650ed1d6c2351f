//! The admin manifest: which entities an admin front-end can manage, and
//! which operations it may perform on each.

use async_graphql::{Enum, SimpleObject};
use serde::Serialize;

#[derive(Enum, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Event,
    Charity,
    PriceLevelOption,
    Merchandise,
    Discount,
    Department,
    Staff,
    Attendee,
    EmergencyContact,
}

impl EntityKind {
    /// Every managed entity, in the order admin screens list them.
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Event,
        EntityKind::Charity,
        EntityKind::PriceLevelOption,
        EntityKind::Merchandise,
        EntityKind::Discount,
        EntityKind::Department,
        EntityKind::Staff,
        EntityKind::Attendee,
        EntityKind::EmergencyContact,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Event => "Event",
            EntityKind::Charity => "Charity",
            EntityKind::PriceLevelOption => "Price Level Option",
            EntityKind::Merchandise => "Merchandise",
            EntityKind::Discount => "Discount",
            EntityKind::Department => "Department",
            EntityKind::Staff => "Staff",
            EntityKind::Attendee => "Attendee",
            EntityKind::EmergencyContact => "Emergency Contact",
        }
    }

    pub fn plural_label(&self) -> &'static str {
        match self {
            EntityKind::Event => "Events",
            EntityKind::Charity => "Charities",
            EntityKind::PriceLevelOption => "Price Level Options",
            EntityKind::Merchandise => "Merchandise",
            EntityKind::Discount => "Discounts",
            EntityKind::Department => "Departments",
            EntityKind::Staff => "Staff",
            EntityKind::Attendee => "Attendees",
            EntityKind::EmergencyContact => "Emergency Contacts",
        }
    }
}

#[derive(Enum, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrudOperation {
    Create,
    Read,
    Update,
    Delete,
}

impl CrudOperation {
    pub const ALL: [CrudOperation; 4] = [
        CrudOperation::Create,
        CrudOperation::Read,
        CrudOperation::Update,
        CrudOperation::Delete,
    ];
}

/// One entity exposed to admins
#[derive(SimpleObject, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminEntity {
    pub entity: EntityKind,
    pub label: String,
    pub plural_label: String,
    /// What admins may do with this entity
    pub operations: Vec<CrudOperation>,
}

impl AdminEntity {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            label: entity.label().to_owned(),
            plural_label: entity.plural_label().to_owned(),
            operations: CrudOperation::ALL.to_vec(),
        }
    }
}

/// Every entity registered for admin access, in display order
#[derive(SimpleObject, Serialize, Clone, Debug, PartialEq)]
pub struct AdminManifest {
    pub entities: Vec<AdminEntity>,
}

impl Default for AdminManifest {
    fn default() -> Self {
        Self {
            entities: EntityKind::ALL.iter().copied().map(AdminEntity::new).collect(),
        }
    }
}

impl AdminManifest {
    pub fn entry(&self, entity: EntityKind) -> Option<&AdminEntity> {
        self.entities.iter().find(|entry| entry.entity == entity)
    }

    pub fn allows(&self, entity: EntityKind, operation: CrudOperation) -> bool {
        self.entry(entity)
            .map(|entry| entry.operations.contains(&operation))
            .unwrap_or(false)
    }

    /// The same manifest with one operation taken away from an entity.
    pub fn without(mut self, entity: EntityKind, operation: CrudOperation) -> Self {
        for entry in self.entities.iter_mut().filter(|entry| entry.entity == entity) {
            entry.operations.retain(|allowed| *allowed != operation);
        }

        self
    }
}
