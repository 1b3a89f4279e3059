//! Request and response bodies shared by the route handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskdash_users::{User, UserSettings};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsBody {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub dark_mode: bool,
    pub two_factor_auth: bool,
    pub public_profile: bool,
}

impl From<UserSettings> for SettingsBody {
    fn from(value: UserSettings) -> Self {
        Self {
            email_notifications: value.email_notifications,
            push_notifications: value.push_notifications,
            dark_mode: value.dark_mode,
            two_factor_auth: value.two_factor_auth,
            public_profile: value.public_profile,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsUpdateResponse {
    pub message: String,
    pub settings: SettingsBody,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub settings: SettingsBody,
}

impl From<&User> for LoginUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            settings: user.settings.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: LoginUser,
    pub token: String,
}

/// Public profile view. Never carries credential material.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub settings: SettingsBody,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            profile_picture: user.profile_picture.clone(),
            settings: user.settings.into(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Documented shape of a profile PATCH body. Handlers validate the raw JSON
/// so unknown keys can be rejected.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}
