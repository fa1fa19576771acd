//! Liveness endpoint.

use axum::Json;

use crate::models::MessageResponse;

/// `GET /healthz`: always `{"message": "ok"}` while the process serves requests.
pub async fn healthz() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "ok".to_string(),
    })
}
