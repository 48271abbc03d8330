//! OpenAPI documentation, served at `/openapi.json`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Bearer token security scheme referenced by the protected routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearer".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Access token from `POST /token`. Include it in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        api::handlers::auth::login,
        api::handlers::users::register,
        api::handlers::users::read_users_me,
        api::handlers::users::get_user,
    ),
    components(
        schemas(
            api::models::auth::TokenRequest,
            api::models::auth::Token,
            api::models::users::UserCreate,
            api::models::users::UserResponse,
        )
    ),
    tags(
        (name = "authentication", description = "Exchange a username and password for an access token"),
        (name = "users", description = "Registration and user lookup"),
    ),
    info(
        title = "authsvc",
        description = "Username/password authentication with signed bearer tokens",
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes_and_security() {
        let doc = ApiDoc::openapi();

        for path in ["/token", "/users/", "/users/me/", "/users/{user_id}"] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
        assert!(components.schemas.contains_key("UserResponse"));
    }
}
