//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/uploader selection and the shared catalog service
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs, multipart form parsing and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Extension, Router};
use tower::ServiceBuilder;

use crate::config::AppConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(router(services, config.max_upload_bytes))
}

/// Router over already-built services.
pub fn router(services: Arc<services::AppServices>, max_upload_bytes: usize) -> Router {
    Router::new()
        .merge(routes::system_router())
        .merge(routes::router().layer(Extension(services)))
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(max_upload_bytes)))
}
