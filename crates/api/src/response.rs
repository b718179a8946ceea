//! JSON response envelope.
//!
//! Every endpoint answers with `{ "success": bool, "data"?: T, "message"?: string }`.
//! Endpoints that need extra top-level fields (`user`, `cartItem`,
//! `approvalURL`) define their own response structs with the same `success` flag.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Successful response with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Failed response with a client-safe message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_omits_message() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": [1, 2] }));
    }

    #[test]
    fn test_failure_shape() {
        let json = serde_json::to_value(ApiResponse::failure("Cart not found!")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "message": "Cart not found!" })
        );
    }

    #[test]
    fn test_data_with_message() {
        let json =
            serde_json::to_value(ApiResponse::ok("x").with_message("Orders fetched successfully"))
                .unwrap();
        assert_eq!(json["message"], "Orders fetched successfully");
        assert_eq!(json["data"], "x");
    }
}
