//! Error types for the user system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    UserNotFound,

    #[error("User with this email already exists")]
    EmailTaken,

    #[error("User with this username already exists")]
    UsernameTaken,

    #[error("{0}")]
    ValidationFailed(String),

    /// Keys rejected by a settings write, either unknown or not boolean.
    #[error("Invalid settings: {}", .0.join(", "))]
    InvalidSettings(Vec<String>),

    /// Keys a profile update is not allowed to touch.
    #[error("Invalid updates!")]
    InvalidUpdates(Vec<String>),

    #[error("Password hashing failed")]
    PasswordHashingFailed,

    #[error("storage error: {0}")]
    Storage(String),
}

impl UserError {
    pub fn storage(error: impl std::fmt::Display) -> Self {
        Self::Storage(error.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed(message.into())
    }
}

pub type UserResult<T> = Result<T, UserError>;
