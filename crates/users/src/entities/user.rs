use chrono::{DateTime, Utc};

use super::settings::UserSettings;

/// A registered account as held by a [`UserStore`](crate::UserStore).
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Opaque collision-resistant identifier
    pub id: String,
    pub username: String,
    /// Stored trimmed and lower-cased
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub settings: UserSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl User {
    pub fn new(new_user: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: cuid2::create_id(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            bio: None,
            profile_picture: None,
            settings: UserSettings::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("bio", &self.bio)
            .field("profile_picture", &self.profile_picture)
            .field("settings", &self.settings)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::new(NewUser {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
        })
    }

    #[test]
    fn new_user_gets_id_and_default_settings() {
        let user = sample();
        assert!(!user.id.is_empty());
        assert_eq!(user.settings, UserSettings::default());
        assert_eq!(user.created_at, user.updated_at);
        assert_ne!(user.id, sample().id);
    }

    #[test]
    fn debug_output_redacts_password_hash() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("argon2"));
    }
}
