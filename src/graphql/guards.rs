use async_graphql::{Context, Guard, Result};
use tracing::debug;

use crate::admin::{AdminManifest, CrudOperation, EntityKind};

/// Allows a field only if the schema's admin manifest grants the operation.
pub struct AdminAccess {
    entity: EntityKind,
    operation: CrudOperation,
}

impl AdminAccess {
    pub const fn new(entity: EntityKind, operation: CrudOperation) -> Self {
        Self { entity, operation }
    }

    pub const fn create(entity: EntityKind) -> Self {
        Self::new(entity, CrudOperation::Create)
    }

    pub const fn read(entity: EntityKind) -> Self {
        Self::new(entity, CrudOperation::Read)
    }

    pub const fn update(entity: EntityKind) -> Self {
        Self::new(entity, CrudOperation::Update)
    }

    pub const fn delete(entity: EntityKind) -> Self {
        Self::new(entity, CrudOperation::Delete)
    }
}

#[async_trait::async_trait]
impl Guard for AdminAccess {
    async fn check(&self, ctx: &Context<'_>) -> Result<()> {
        let allowed = ctx
            .data_opt::<AdminManifest>()
            .map(|manifest| manifest.allows(self.entity, self.operation))
            .unwrap_or(false);

        if allowed {
            Ok(())
        } else {
            debug!(entity = ?self.entity, operation = ?self.operation, "admin operation refused");
            Err(format!(
                "{:?} is not allowed on {}",
                self.operation,
                self.entity.plural_label()
            )
            .into())
        }
    }
}
