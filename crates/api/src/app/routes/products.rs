//! Public catalog reads.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/featured", get(featured_products))
        .route("/:id", get(get_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::SearchParams>,
) -> axum::response::Response {
    match services.catalog().public_list(params.q.as_deref()).await {
        Ok(items) => (StatusCode::OK, Json(dto::products_to_json(items))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn featured_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog().featured().await {
        Ok(items) => (StatusCode::OK, Json(dto::products_to_json(items))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog().get_product(id).await {
        Ok(p) => (StatusCode::OK, Json(dto::product_to_json(p))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
