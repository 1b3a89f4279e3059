use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde_json::Value;
use taskdash_users::ProfileUpdate;

use crate::{
    middleware::CurrentUser,
    routes::models::{MessageResponse, ProfileResponse, ProfileUpdateRequest},
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = ProfileResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_profile(Extension(current): Extension<CurrentUser>) -> Json<ProfileResponse> {
    Json((&current.0).into())
}

#[utoipa::path(
    patch,
    path = "/api/profile",
    tag = "Profile",
    security(("bearerAuth" = [])),
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated user profile", body = ProfileResponse),
        (status = 400, description = "Invalid updates or taken username/email", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let Json(body) = payload?;
    let update = ProfileUpdate::from_json(&body)?;

    let updated = state.users().update_profile(current.id(), update).await?;
    Ok(Json((&updated).into()))
}

#[utoipa::path(
    delete,
    path = "/api/profile",
    tag = "Profile",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Account removed", body = MessageResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users().delete_user(current.id()).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
