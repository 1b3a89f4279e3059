use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde_json::Value;
use taskdash_users::SettingsPatch;

use crate::{
    middleware::CurrentUser,
    routes::models::{SettingsBody, SettingsUpdateResponse},
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current settings, defaults if never written", body = SettingsBody),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<SettingsBody>, ApiError> {
    let settings = state.users().get_settings(current.id()).await?;
    Ok(Json(settings.into()))
}

#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    security(("bearerAuth" = [])),
    request_body(content = SettingsBody, description = "Any subset of the settings flags"),
    responses(
        (status = 200, description = "Settings merged", body = SettingsUpdateResponse),
        (status = 400, description = "Unknown key or non-boolean value", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SettingsUpdateResponse>, ApiError> {
    let Json(body) = payload?;
    let patch = SettingsPatch::from_json(&body)?;

    let settings = state.users().update_settings(current.id(), &patch).await?;

    Ok(Json(SettingsUpdateResponse {
        message: "Settings updated successfully".to_string(),
        settings: settings.into(),
    }))
}
