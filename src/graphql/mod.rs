use async_graphql::{EmptySubscription, Schema};
use sqlx::SqlitePool;

use crate::admin::AdminManifest;
use crate::file::MediaStore;
use crate::graphql::mutation::MutationRoot;
use crate::graphql::query::QueryRoot;

pub mod guards;
pub mod mutation;
pub mod query;

pub const SUCCESS_MESSAGE: &str = "success";

pub type RegcoreSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Every CRUD field is checked against `manifest` before it runs.
pub fn build_schema(pool: SqlitePool, media: MediaStore, manifest: AdminManifest) -> RegcoreSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(pool)
        .data(media)
        .data(manifest)
        .finish()
}
