use std::sync::Arc;

use taskdash_auth::Authenticator;
use taskdash_users::{User, UserService};

use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    authenticator: Authenticator,
    users: UserService,
    allowed_origins: Arc<[String]>,
}

impl AppState {
    pub fn new(authenticator: Authenticator, users: UserService) -> Self {
        Self {
            authenticator,
            users,
            allowed_origins: Arc::from(Vec::new()),
        }
    }

    /// Restrict CORS to these origins. An empty list allows any origin.
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = Arc::from(origins);
        self
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    pub async fn authenticate(&self, token: &str) -> Result<User, ApiError> {
        self.authenticator
            .authenticate(token)
            .await
            .map_err(ApiError::from)
    }
}
