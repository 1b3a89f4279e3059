use axum::Json;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::health::root,
        crate::routes::health::api_test,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::settings::get_settings,
        crate::routes::settings::update_settings,
        crate::routes::profile::get_profile,
        crate::routes::profile::update_profile,
        crate::routes::profile::delete_profile
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::models::MessageResponse,
            crate::routes::models::SettingsBody,
            crate::routes::models::SettingsUpdateResponse,
            crate::routes::models::RegisterRequest,
            crate::routes::models::LoginRequest,
            crate::routes::models::LoginUser,
            crate::routes::models::LoginResponse,
            crate::routes::models::ProfileResponse,
            crate::routes::models::ProfileUpdateRequest
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Registration and login"),
        (name = "Settings", description = "Per-user preference flags"),
        (name = "Profile", description = "User profile management")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("JWT".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
