use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use colourmagic_core::ProductId;
use colourmagic_infra::CatalogError;

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        CatalogError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        e @ CatalogError::CapacityExceeded { .. } => {
            json_error(StatusCode::CONFLICT, "capacity_exceeded", e.to_string())
        }
        CatalogError::Upload(e) => {
            tracing::warn!(error = %e, "image upload failed");
            json_error(
                StatusCode::BAD_GATEWAY,
                "upload_failed",
                "image upload failed; please try again",
            )
        }
        CatalogError::Store(e) => {
            tracing::error!(error = %e, "product store failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "could not reach the product store; please try again",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_product_id(s: &str) -> Result<ProductId, axum::response::Response> {
    s.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"))
}
