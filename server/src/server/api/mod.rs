//! REST API handlers grouped by domain.

pub mod device;
pub mod image;
pub mod settings;

use axum::Json;
use serde_json::{Value, json};

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> (axum::http::StatusCode, Json<Value>) {
    (
        axum::http::StatusCode::from_u16(status).unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_err_json_shapes_body() {
        let (status, Json(body)) = err_json(404, "Image 3 not found");
        assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "status": "error", "error": "Image 3 not found" }));
    }

    #[test]
    fn test_err_json_invalid_status_is_internal_error() {
        let (status, _) = err_json(42, "odd");
        assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
