//! Contact form endpoint.
//!
//! Enquiries are validated, but no delivery channel is configured, so valid ones are
//! answered with `503 not_configured`.

use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};

use colourmagic_catalog::ContactEnquiry;

use crate::app::errors;

pub fn router() -> Router {
    Router::new().route("/contact", post(submit_enquiry))
}

pub async fn submit_enquiry(Json(enquiry): Json<ContactEnquiry>) -> axum::response::Response {
    let invalid = enquiry.invalid_fields();
    if !invalid.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "validation_error",
                "message": "please correct the highlighted fields",
                "fields": invalid,
            })),
        )
            .into_response();
    }

    tracing::info!(subject = enquiry.subject.as_deref().unwrap_or(""), "contact enquiry received");
    errors::json_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "not_configured",
        "sending enquiries is not configured yet; please call or email us directly",
    )
}
