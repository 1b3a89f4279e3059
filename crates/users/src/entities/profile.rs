use serde_json::{Map, Value};

use crate::types::{UserError, UserResult};
use crate::utils::validation::{
    normalize_email, validate_bio, validate_email, validate_password, validate_profile_picture,
    validate_username,
};

const ALLOWED_UPDATES: &[&str] = &["username", "email", "password", "bio", "profilePicture"];

/// A validated partial profile change.
///
/// `bio` and `profile_picture` use a nested option: `Some(None)` clears the
/// field, `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<Option<String>>,
    pub profile_picture: Option<Option<String>>,
}

impl ProfileUpdate {
    /// Parse and validate a raw PATCH body.
    ///
    /// Any key outside the updatable set rejects the whole body.
    pub fn from_json(body: &Value) -> UserResult<Self> {
        let object = body
            .as_object()
            .ok_or_else(|| UserError::validation("Profile update must be a JSON object"))?;

        let rejected: Vec<String> = object
            .keys()
            .filter(|key| !ALLOWED_UPDATES.contains(&key.as_str()))
            .cloned()
            .collect();
        if !rejected.is_empty() {
            return Err(UserError::InvalidUpdates(rejected));
        }

        let mut update = Self::default();

        if let Some(username) = required_string(object, "username")? {
            let username = username.trim().to_string();
            validate_username(&username)?;
            update.username = Some(username);
        }

        if let Some(email) = required_string(object, "email")? {
            let email = normalize_email(&email);
            validate_email(&email)?;
            update.email = Some(email);
        }

        if let Some(password) = required_string(object, "password")? {
            validate_password(&password)?;
            update.password = Some(password);
        }

        if let Some(bio) = nullable_string(object, "bio")? {
            let bio = bio.map(|b| b.trim().to_string()).filter(|b| !b.is_empty());
            if let Some(ref text) = bio {
                validate_bio(text)?;
            }
            update.bio = Some(bio);
        }

        if let Some(picture) = nullable_string(object, "profilePicture")? {
            let picture = picture.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
            if let Some(ref url) = picture {
                validate_profile_picture(url)?;
            }
            update.profile_picture = Some(picture);
        }

        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn required_string(object: &Map<String, Value>, key: &str) -> UserResult<Option<String>> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(UserError::validation(format!("{key} must be a string"))),
    }
}

fn nullable_string(object: &Map<String, Value>, key: &str) -> UserResult<Option<Option<String>>> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(value)) => Ok(Some(Some(value.clone()))),
        Some(_) => Err(UserError::validation(format!("{key} must be a string or null"))),
    }
}
