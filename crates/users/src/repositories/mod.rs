//! Data access seam for users.
//!
//! Services and the HTTP layer only see [`UserStore`]; the in-memory store
//! lives here and the SQLite one in `taskdash-database`.

pub mod memory;

use async_trait::async_trait;

use crate::entities::{User, UserSettings};
use crate::types::UserResult;

pub use memory::MemoryUserStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user. Fails with `EmailTaken` or `UsernameTaken` when
    /// either unique field is already in use.
    async fn insert(&self, user: User) -> UserResult<User>;

    async fn find_by_id(&self, id: &str) -> UserResult<Option<User>>;

    /// Lookup by normalised (trimmed, lower-cased) email.
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>>;

    /// Replace the profile columns of an existing user. Settings are left
    /// as stored; they only change through `update_settings`.
    async fn update(&self, user: User) -> UserResult<User>;

    async fn update_settings(&self, id: &str, settings: UserSettings) -> UserResult<User>;

    /// Hard delete. Fails with `UserNotFound` when nothing was removed.
    async fn delete(&self, id: &str) -> UserResult<()>;
}
