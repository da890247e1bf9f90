//! Admin catalog management: create, edit, delete, reorder and feature products.
//!
//! Handlers only translate HTTP into service calls; every rule lives in `CatalogService`.

use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use colourmagic_catalog::MoveDirection;

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/next-sort-order", get(next_sort_order))
        .route("/:id", axum::routing::put(update_product).delete(delete_product))
        .route("/:id/move", post(move_product))
        .route("/:id/featured", post(set_featured))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog().admin_list().await {
        Ok(items) => (StatusCode::OK, Json(dto::products_to_json(items))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn next_sort_order(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog().next_sort_order().await {
        Ok(n) => (StatusCode::OK, Json(serde_json::json!({ "sort_order": n }))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    multipart: Multipart,
) -> axum::response::Response {
    let form = match dto::ProductForm::read(multipart).await {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let (cmd, files) = form.into_create();

    match services.catalog().create_product(cmd, files).await {
        Ok(p) => (StatusCode::CREATED, Json(dto::product_to_json(p))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let form = match dto::ProductForm::read(multipart).await {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let (cmd, files) = form.into_update();

    match services.catalog().update_product(id, cmd, files).await {
        Ok(p) => (StatusCode::OK, Json(dto::product_to_json(p))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog().delete_product(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// Responds with the admin list in its new order.
pub async fn move_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::MoveProductRequest>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let direction: MoveDirection = match body.direction.parse() {
        Ok(d) => d,
        Err(e) => return errors::catalog_error_to_response(e.into()),
    };

    if let Err(e) = services.catalog().move_product(id, direction).await {
        return errors::catalog_error_to_response(e);
    }
    list_products(Extension(services)).await
}

pub async fn set_featured(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetFeaturedRequest>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let result = match services.catalog().set_featured(id, body.featured).await {
        Ok(()) => services.catalog().get_product(id).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(p) => (StatusCode::OK, Json(dto::product_to_json(p))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
