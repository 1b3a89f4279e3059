use axum::{http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::routes::models::MessageResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "API banner with endpoint listing"))
)]
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Task Management API is running",
        "endpoints": {
            "register": "POST /api/register",
            "login": "POST /api/login",
            "settings": "GET|PUT /api/settings",
            "profile": "GET|PATCH|DELETE /api/profile",
            "health": "GET /health",
            "docs": "GET /api-docs/openapi.json",
        }
    }))
}

#[utoipa::path(
    get,
    path = "/api/test",
    tag = "Health",
    responses((status = 200, description = "Liveness check", body = MessageResponse))
)]
pub async fn api_test() -> Json<MessageResponse> {
    Json(MessageResponse::new("Server is working"))
}

pub async fn not_found() -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(MessageResponse::new("Route not found")),
    )
}
