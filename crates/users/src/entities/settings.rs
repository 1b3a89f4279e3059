use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{UserError, UserResult};

/// Per-user preference flags.
///
/// Missing fields fall back to their defaults when a stored object is
/// decoded, so rows written before a flag existed still read cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub dark_mode: bool,
    pub two_factor_auth: bool,
    pub public_profile: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: false,
            dark_mode: false,
            two_factor_auth: false,
            public_profile: true,
        }
    }
}

impl UserSettings {
    /// Shallow merge: flags present in the patch win, the rest are kept.
    pub fn merge(&self, patch: &SettingsPatch) -> Self {
        Self {
            email_notifications: patch.email_notifications.unwrap_or(self.email_notifications),
            push_notifications: patch.push_notifications.unwrap_or(self.push_notifications),
            dark_mode: patch.dark_mode.unwrap_or(self.dark_mode),
            two_factor_auth: patch.two_factor_auth.unwrap_or(self.two_factor_auth),
            public_profile: patch.public_profile.unwrap_or(self.public_profile),
        }
    }
}

/// A validated partial settings write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub dark_mode: Option<bool>,
    pub two_factor_auth: Option<bool>,
    pub public_profile: Option<bool>,
}

impl SettingsPatch {
    /// Validate a raw request body.
    ///
    /// Every key must name a [`UserSettings`] flag in camelCase and carry a
    /// boolean. The
    /// whole body is rejected, listing each offending key, if any entry fails.
    ///
    /// ```
    /// use serde_json::json;
    /// use taskdash_users::SettingsPatch;
    ///
    /// let patch = SettingsPatch::from_json(&json!({ "darkMode": true })).unwrap();
    /// assert_eq!(patch.dark_mode, Some(true));
    ///
    /// assert!(SettingsPatch::from_json(&json!({ "theme": "dark" })).is_err());
    /// ```
    pub fn from_json(body: &Value) -> UserResult<Self> {
        let object = body
            .as_object()
            .ok_or_else(|| UserError::validation("Settings must be a JSON object"))?;

        let mut patch = Self::default();
        let mut rejected = Vec::new();

        for (key, value) in object {
            let Some(flag) = value.as_bool() else {
                rejected.push(key.clone());
                continue;
            };

            let slot = match key.as_str() {
                "emailNotifications" => &mut patch.email_notifications,
                "pushNotifications" => &mut patch.push_notifications,
                "darkMode" => &mut patch.dark_mode,
                "twoFactorAuth" => &mut patch.two_factor_auth,
                "publicProfile" => &mut patch.public_profile,
                _ => {
                    rejected.push(key.clone());
                    continue;
                }
            };
            *slot = Some(flag);
        }

        if !rejected.is_empty() {
            return Err(UserError::InvalidSettings(rejected));
        }

        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
