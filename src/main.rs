use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql::{Request, Response};
use axum::response::Html;
use axum::routing::get;
use axum::{Extension, Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use regcore::admin::AdminManifest;
use regcore::config::Config;
use regcore::error::RegcoreError;
use regcore::file::MediaStore;
use regcore::graphql::{build_schema, RegcoreSchema};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,regcore=debug")),
        )
        .with(fmt::layer().with_target(true))
        .init();

    let config = Config::from_env()?;
    let pool = regcore::db::connect(&config.database_url).await?;
    let media = MediaStore::new(config.media_root.clone());
    let manifest = AdminManifest::default();
    let schema = build_schema(pool, media, manifest.clone());

    let app = Router::new()
        .route("/", get(playground).post(query))
        .route("/admin/manifest", get(admin_manifest))
        .layer(Extension(schema))
        .layer(Extension(manifest))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!(
        address = %config.bind_address,
        media_root = %config.media_root.display(),
        "starting registration server"
    );
    axum::Server::bind(&config.bind_address)
        .serve(app.into_make_service())
        .await
        .map_err(|err| RegcoreError::Server(err.to_string()))?;

    Ok(())
}

async fn query(
    Extension(schema): Extension<RegcoreSchema>,
    Json(request): Json<Request>,
) -> Json<Response> {
    Json(schema.execute(request).await)
}

async fn playground() -> Html<String> {
    Html(playground_source(GraphQLPlaygroundConfig::new("/")))
}

async fn admin_manifest(Extension(manifest): Extension<AdminManifest>) -> Json<AdminManifest> {
    Json(manifest)
}
