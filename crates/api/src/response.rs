//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Success envelope: `{ "ok": true, ...data }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    ok: bool,
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self { ok: true, data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Success without data.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

/// Empty success response.
#[must_use]
pub const fn ok() -> ApiResponse<Empty> {
    ApiResponse::ok(Empty {})
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Badge {
        is_pro: bool,
    }

    #[test]
    fn test_data_is_flattened_next_to_ok() {
        let value = serde_json::to_value(ApiResponse::ok(Badge { is_pro: true })).unwrap();
        assert_eq!(value, serde_json::json!({ "ok": true, "isPro": true }));
    }

    #[test]
    fn test_empty_ok() {
        let value = serde_json::to_value(ok()).unwrap();
        assert_eq!(value, serde_json::json!({ "ok": true }));
    }
}
