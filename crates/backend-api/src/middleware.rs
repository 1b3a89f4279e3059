//! Bearer-token gate for the protected routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use taskdash_users::User;
use tracing::debug;

use crate::{util::require_bearer, ApiError, AppState};

/// The authenticated caller, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = require_bearer(request.headers())?;
    let user = state.authenticate(&token).await?;

    debug!(user = %user.id, "request authenticated");
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}
