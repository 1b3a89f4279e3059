//! Credential issuance and verification for Taskdash.
//!
//! [`Authenticator`] registers accounts, exchanges an email and password for
//! a signed token, and resolves a presented token back to a live user.

pub mod jwt;

use std::sync::Arc;

use taskdash_users::utils::{
    hash_password, normalize_email, validate_email, validate_password, validate_username,
    verify_password,
};
use taskdash_users::{NewUser, User, UserError, UserStore};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

pub use jwt::{Claims, IssuedToken, JwtManager};

// Verified against when the email is unknown so both failure paths cost
// one argon2 verification.
static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,
    #[error("Malformed authorization header")]
    MalformedHeader,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User with this email or username already exists")]
    UserExists,
    #[error("{0}")]
    MissingFields(&'static str),
    #[error("token encoding failed: {0}")]
    TokenEncoding(String),
    #[error("auth configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    User(#[from] UserError),
}

#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn UserStore>,
    jwt: JwtManager,
}

impl Authenticator {
    pub fn new(store: Arc<dyn UserStore>, jwt: JwtManager) -> Self {
        Self { store, jwt }
    }

    pub fn store(&self) -> Arc<dyn UserStore> {
        Arc::clone(&self.store)
    }

    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }

    /// Create an account with default settings. No token is issued.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        if [username, email, password].iter().any(|v| v.trim().is_empty()) {
            return Err(AuthError::MissingFields(
                "Username, email, and password are required",
            ));
        }

        let username = username.trim();
        let email = normalize_email(email);
        validate_username(username)?;
        validate_email(&email)?;
        validate_password(password)?;

        if self.store.find_by_email(&email).await?.is_some()
            || self.store.find_by_username(username).await?.is_some()
        {
            return Err(AuthError::UserExists);
        }

        let password_hash = hash_password(password).await?;
        let user = self
            .store
            .insert(User::new(NewUser {
                username: username.to_owned(),
                email,
                password_hash,
            }))
            .await
            .map_err(|err| match err {
                // lost a race against a concurrent registration
                UserError::EmailTaken | UserError::UsernameTaken => AuthError::UserExists,
                other => AuthError::User(other),
            })?;

        info!(user = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Exchange credentials for a token. Unknown email and wrong password
    /// fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, IssuedToken), AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields("Email and password are required"));
        }

        let email = normalize_email(email);
        let Some(user) = self.store.find_by_email(&email).await? else {
            let dummy = DUMMY_HASH
                .get_or_try_init(|| hash_password("taskdash-dummy-password"))
                .await?;
            let _ = verify_password(password, dummy).await?;
            debug!("login rejected for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash).await? {
            debug!(user = %user.id, "login rejected for wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.jwt.issue(&user.id)?;
        info!(user = %user.id, expires_at = %issued.expires_at, "user logged in");
        Ok((user, issued))
    }

    /// Verify a raw token and load the user it names.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.jwt.verify(token)?;
        self.store
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
