use axum::{routing::get, Router};

pub mod admin;
pub mod contact;
pub mod products;
pub mod system;

/// Router for every endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/admin/products", admin::router())
        .merge(contact::router())
}

/// Liveness only.
pub fn system_router() -> Router {
    Router::new().route("/health", get(system::health))
}
