use crate::{
    AppState,
    auth::session,
    db::models::users::UserDBResponse,
    errors::{Error, Result},
};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::{debug, instrument, trace};

/// The authenticated, authorized user behind a request.
///
/// Extracting it runs the whole session pipeline: read the bearer token, verify it, load the
/// subject from the store and check the account is not disabled.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserDBResponse);

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// Returns `None` when the header is missing, not valid UTF-8 or uses another scheme. The scheme
/// is matched case-insensitively.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let auth_str = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = auth_str.split_once(' ').unwrap_or((auth_str, ""));
    scheme.eq_ignore_ascii_case("bearer").then_some(token.trim())
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let Some(token) = bearer_token(parts) else {
            trace!("No bearer credentials found in request");
            return Err(Error::Unauthenticated);
        };

        let claims = state.verifier.verify(token).inspect_err(|e| trace!("Token verification failed: {e}"))?;

        let user = session::load_active_user(&*state.users, &claims).await?;
        debug!("Found token authenticated user: {}", user.id);

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::token::TokenIssuer,
        db::{UserStore as _, models::users::UserCreateDBRequest},
        errors::AuthFailure,
        test_utils::{TEST_SECRET, create_test_state},
    };
    use axum::extract::FromRequestParts as _;
    use jsonwebtoken::Algorithm;
    use std::time::Duration;

    fn parts_with_authorization(value: Option<&str>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("http://localhost/users/me/");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (parts, _body) = builder.body(()).unwrap().into_parts();
        parts
    }

    async fn create_user(state: &AppState, username: &str, disabled: bool) {
        state
            .users
            .create(&UserCreateDBRequest {
                username: username.to_string(),
                password_hash: "unused".to_string(),
                full_name: None,
                is_active: true,
                disabled,
            })
            .await
            .unwrap();
    }

    async fn extract(state: &AppState, authorization: Option<&str>) -> Result<CurrentUser> {
        let mut parts = parts_with_authorization(authorization);
        CurrentUser::from_request_parts(&mut parts, state).await
    }

    #[test]
    fn test_bearer_token_parsing() {
        let cases = [
            (Some("Bearer abc.def.ghi"), Some("abc.def.ghi")),
            (Some("bearer abc"), Some("abc")),
            (Some("BEARER abc"), Some("abc")),
            (Some("Bearer"), Some("")),
            (Some("Basic dXNlcjpwYXNz"), None),
            (Some("Token abc"), None),
            (None, None),
        ];

        for (header_value, expected) in cases {
            let parts = parts_with_authorization(header_value);
            assert_eq!(bearer_token(&parts), expected, "header {header_value:?}");
        }
    }

    #[tokio::test]
    async fn test_valid_token_extracts_user() {
        let state = create_test_state();
        create_user(&state, "johndoe", false).await;
        let token = state.issuer.issue("johndoe", None).unwrap();

        let CurrentUser(user) = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap();
        assert_eq!(user.username, "johndoe");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthenticated() {
        let state = create_test_state();
        assert!(matches!(extract(&state, None).await, Err(Error::Unauthenticated)));
        assert!(matches!(
            extract(&state, Some("Basic dXNlcjpwYXNz")).await,
            Err(Error::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_each_stage_reports_its_failure() {
        let state = create_test_state();
        create_user(&state, "alice", true).await;

        let garbage = extract(&state, Some("Bearer garbage")).await;
        assert!(matches!(garbage, Err(Error::Auth(AuthFailure::TokenInvalid))));

        let foreign = TokenIssuer::new("some-other-secret", Algorithm::HS256)
            .issue("alice", None)
            .unwrap();
        let foreign = extract(&state, Some(&format!("Bearer {foreign}"))).await;
        assert!(matches!(foreign, Err(Error::Auth(AuthFailure::TokenInvalid))));

        let ghost = state.issuer.issue("ghost", None).unwrap();
        let ghost = extract(&state, Some(&format!("Bearer {ghost}"))).await;
        assert!(matches!(ghost, Err(Error::Auth(AuthFailure::UserNotFound))));

        let disabled = state.issuer.issue("alice", None).unwrap();
        let disabled = extract(&state, Some(&format!("Bearer {disabled}"))).await;
        assert!(matches!(disabled, Err(Error::Auth(AuthFailure::AccountDisabled))));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let state = create_test_state();
        create_user(&state, "johndoe", false).await;
        let token = TokenIssuer::new(TEST_SECRET, Algorithm::HS256)
            .issue("johndoe", Some(Duration::ZERO))
            .unwrap();

        let result = extract(&state, Some(&format!("Bearer {token}"))).await;
        assert!(matches!(result, Err(Error::Auth(AuthFailure::TokenExpired))));
    }
}
