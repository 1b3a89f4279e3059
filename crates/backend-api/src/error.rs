use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use taskdash_auth::AuthError;
use taskdash_users::UserError;
use tracing::{debug, error};
use utoipa::ToSchema;

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// The detail goes to the log; the client only sees a generic message.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::MissingToken
            | AuthError::MalformedHeader
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::UserNotFound
            | AuthError::InvalidCredentials => {
                debug!(error = %error, "authentication rejected");
                Self::unauthorized(error.to_string())
            }
            AuthError::UserExists | AuthError::MissingFields(_) => {
                Self::bad_request(error.to_string())
            }
            AuthError::TokenEncoding(_) | AuthError::Configuration(_) => Self::internal(error),
            AuthError::User(inner) => inner.into(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::UserNotFound => Self::not_found(error.to_string()),
            UserError::EmailTaken
            | UserError::UsernameTaken
            | UserError::ValidationFailed(_)
            | UserError::InvalidSettings(_)
            | UserError::InvalidUpdates(_) => Self::bad_request(error.to_string()),
            UserError::PasswordHashingFailed | UserError::Storage(_) => Self::internal(error),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection.body_text(), "rejected request body");
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}
