//! API errors and their JSON rendering.
//!
//! Every failure leaves the server as `{"error": "<message>"}`, the shape the page scripts read
//! from non-OK responses. Internal causes are logged and never echoed to the client.

use api_shared::ErrorRes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medref_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("HPI generation failed: {0}")]
    Generation(#[source] CoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, *msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, *msg),
            ApiError::Generation(e) => {
                tracing::error!("HPI generation error: {:?}", e);
                (StatusCode::BAD_GATEWAY, "HPI generation failed")
            }
        };

        (status, Json(ErrorRes::new(message))).into_response()
    }
}
