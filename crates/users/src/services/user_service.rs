//! Profile and settings operations on top of a [`UserStore`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::entities::{ProfileUpdate, SettingsPatch, User, UserSettings};
use crate::repositories::UserStore;
use crate::types::{UserError, UserResult};
use crate::utils::hash_password;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub async fn get_user(&self, user_id: &str) -> UserResult<User> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::UserNotFound)
    }

    /// Apply a validated profile change.
    ///
    /// Username and email are re-checked against other accounts before the
    /// write; the store enforces the same constraint again on commit.
    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> UserResult<User> {
        let mut user = self.get_user(user_id).await?;

        if update.is_empty() {
            return Ok(user);
        }

        if let Some(username) = update.username {
            if username != user.username {
                if let Some(other) = self.store.find_by_username(&username).await? {
                    if other.id != user.id {
                        return Err(UserError::UsernameTaken);
                    }
                }
                user.username = username;
            }
        }

        if let Some(email) = update.email {
            if email != user.email {
                if let Some(other) = self.store.find_by_email(&email).await? {
                    if other.id != user.id {
                        return Err(UserError::EmailTaken);
                    }
                }
                user.email = email;
            }
        }

        let password_changed = update.password.is_some();
        if let Some(password) = update.password {
            user.password_hash = hash_password(&password).await?;
        }

        if let Some(bio) = update.bio {
            user.bio = bio;
        }

        if let Some(picture) = update.profile_picture {
            user.profile_picture = picture;
        }

        let user = self.store.update(user).await?;
        info!(user = %user.id, password_changed, "profile updated");
        Ok(user)
    }

    pub async fn delete_user(&self, user_id: &str) -> UserResult<()> {
        self.store.delete(user_id).await?;
        warn!(user = %user_id, "user deleted");
        Ok(())
    }

    pub async fn get_settings(&self, user_id: &str) -> UserResult<UserSettings> {
        Ok(self.get_user(user_id).await?.settings)
    }

    /// Shallow-merge a validated patch into the stored settings.
    pub async fn update_settings(
        &self,
        user_id: &str,
        patch: &SettingsPatch,
    ) -> UserResult<UserSettings> {
        let current = self.get_settings(user_id).await?;
        if patch.is_empty() {
            debug!(user = %user_id, "empty settings patch, nothing to write");
            return Ok(current);
        }

        let merged = current.merge(patch);
        let user = self.store.update_settings(user_id, merged).await?;
        info!(user = %user.id, "settings updated");
        Ok(user.settings)
    }
}
