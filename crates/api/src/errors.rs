//! Fallback pages.

use axum::{
    Json,
    http::Uri,
    response::{IntoResponse, Response},
};
use serde_json::json;
use yatube_common::AppError;

/// 404 page for paths no route matches.
pub async fn not_found(uri: Uri) -> Response {
    tracing::debug!(path = %uri.path(), "No route");
    let err = AppError::NotFound(uri.path().to_string());
    (
        err.status_code(),
        Json(json!({
            "error": {
                "code": err.error_code(),
                "message": err.to_string(),
                "path": uri.path(),
            }
        })),
    )
        .into_response()
}
