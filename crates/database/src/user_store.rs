//! SQLite-backed [`UserStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use taskdash_users::{User, UserError, UserResult, UserSettings, UserStore};
use tracing::warn;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, bio, profile_picture, settings, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> UserResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(UserError::storage)?;

        row.as_ref().map(user_from_row).transpose()
    }
}

fn user_from_row(row: &SqliteRow) -> UserResult<User> {
    let id: String = row.try_get("id").map_err(UserError::storage)?;
    let raw_settings: Option<String> = row.try_get("settings").map_err(UserError::storage)?;

    let settings = decode_settings(&id, raw_settings);

    Ok(User {
        username: row.try_get("username").map_err(UserError::storage)?,
        email: row.try_get("email").map_err(UserError::storage)?,
        password_hash: row.try_get("password_hash").map_err(UserError::storage)?,
        bio: row.try_get("bio").map_err(UserError::storage)?,
        profile_picture: row.try_get("profile_picture").map_err(UserError::storage)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(UserError::storage)?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(UserError::storage)?,
        settings,
        id,
    })
}

fn decode_settings(id: &str, raw: Option<String>) -> UserSettings {
    match raw {
        None => UserSettings::default(),
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(user = %id, error = %err, "unreadable stored settings, using defaults");
            UserSettings::default()
        }),
    }
}

fn encode_settings(settings: &UserSettings) -> UserResult<String> {
    serde_json::to_string(settings).map_err(UserError::storage)
}

/// Translate UNIQUE constraint failures into the matching domain error.
fn map_write_error(err: sqlx::Error) -> UserError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("users.email") {
                return UserError::EmailTaken;
            }
            if message.contains("users.username") {
                return UserError::UsernameTaken;
            }
        }
    }
    UserError::storage(err)
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn insert(&self, user: User) -> UserResult<User> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, bio, profile_picture, settings, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.bio)
        .bind(&user.profile_picture)
        .bind(encode_settings(&user.settings)?)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> UserResult<Option<User>> {
        self.find_one("id", id).await
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        self.find_one("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        self.find_one("username", username).await
    }

    async fn update(&self, mut user: User) -> UserResult<User> {
        user.touch();

        // settings belong to update_settings; echo back whatever is stored
        let row = sqlx::query(
            "UPDATE users SET username = ?, email = ?, password_hash = ?, bio = ?, profile_picture = ?, updated_at = ? WHERE id = ? RETURNING settings",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.bio)
        .bind(&user.profile_picture)
        .bind(user.updated_at)
        .bind(&user.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(UserError::UserNotFound)?;

        let raw_settings: Option<String> = row.try_get("settings").map_err(UserError::storage)?;
        user.settings = decode_settings(&user.id, raw_settings);

        Ok(user)
    }

    async fn update_settings(&self, id: &str, settings: UserSettings) -> UserResult<User> {
        let result = sqlx::query("UPDATE users SET settings = ?, updated_at = ? WHERE id = ?")
            .bind(encode_settings(&settings)?)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(UserError::storage)?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }

        self.find_by_id(id).await?.ok_or(UserError::UserNotFound)
    }

    async fn delete(&self, id: &str) -> UserResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(UserError::storage)?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }

        Ok(())
    }
}
