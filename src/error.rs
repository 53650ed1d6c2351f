//! Errors from running the service itself.
//!
//! Model and GraphQL operations report failures through
//! `async_graphql::Result` so they land in the response's `errors` list;
//! everything around them (configuration, the database connection, media
//! storage, serving HTTP) uses [`RegcoreError`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegcoreError {
    /// A configuration variable was present but could not be used.
    #[error("invalid configuration for {name}: {reason}")]
    Config { name: &'static str, reason: String },
    /// The database could not be opened.
    #[error("error connecting to database: {0}")]
    Connection(#[source] sqlx::Error),
    /// The bundled migrations failed to apply.
    #[error("error migrating database: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    /// A query failed outside of a GraphQL request.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Reading or writing the media directory failed.
    #[error("media storage error: {0}")]
    Media(#[from] std::io::Error),
    /// An uploaded file was unusable.
    #[error("bad upload: {0}")]
    BadUpload(String),
    /// The HTTP server stopped unexpectedly.
    #[error("server error: {0}")]
    Server(String),
}

pub type RegcoreResult<T> = Result<T, RegcoreError>;

impl RegcoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            RegcoreError::BadUpload(_) => StatusCode::BAD_REQUEST,
            RegcoreError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            RegcoreError::Config { .. }
            | RegcoreError::Migration(_)
            | RegcoreError::Database(_)
            | RegcoreError::Media(_)
            | RegcoreError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RegcoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "message": self.to_string(),
            "statusCode": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
