use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::UserStore;
use crate::entities::{User, UserSettings};
use crate::types::{UserError, UserResult};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    email_index: HashMap<String, String>,
    username_index: HashMap<String, String>,
}

impl Tables {
    fn check_unique(&self, user: &User) -> UserResult<()> {
        if let Some(owner) = self.email_index.get(&user.email) {
            if owner != &user.id {
                return Err(UserError::EmailTaken);
            }
        }
        if let Some(owner) = self.username_index.get(&user.username) {
            if owner != &user.id {
                return Err(UserError::UsernameTaken);
            }
        }
        Ok(())
    }
}

/// Process-local store. Uniqueness checks and writes happen under one lock.
#[derive(Default)]
pub struct MemoryUserStore {
    tables: RwLock<Tables>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: User) -> UserResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(UserError::storage(format!("duplicate user id {}", user.id)));
        }
        tables.check_unique(&user)?;

        tables.email_index.insert(user.email.clone(), user.id.clone());
        tables
            .username_index
            .insert(user.username.clone(), user.id.clone());
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> UserResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .email_index
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .username_index
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn update(&self, mut user: User) -> UserResult<User> {
        let mut tables = self.tables.write().await;
        let previous = tables
            .users
            .get(&user.id)
            .cloned()
            .ok_or(UserError::UserNotFound)?;
        tables.check_unique(&user)?;

        if previous.email != user.email {
            tables.email_index.remove(&previous.email);
            tables.email_index.insert(user.email.clone(), user.id.clone());
        }
        if previous.username != user.username {
            tables.username_index.remove(&previous.username);
            tables
                .username_index
                .insert(user.username.clone(), user.id.clone());
        }

        user.settings = previous.settings;
        user.touch();
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update_settings(&self, id: &str, settings: UserSettings) -> UserResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(id).ok_or(UserError::UserNotFound)?;
        user.settings = settings;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> UserResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables.users.remove(id).ok_or(UserError::UserNotFound)?;
        tables.email_index.remove(&user.email);
        tables.username_index.remove(&user.username);
        Ok(())
    }
}
