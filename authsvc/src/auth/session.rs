//! Turning verified token claims into an authorized user.

use tracing::{debug, instrument};

use crate::{
    auth::token::Claims,
    db::{UserStore, models::users::UserDBResponse},
    errors::{AuthFailure, Result},
};

/// Load the user named by a token's subject.
///
/// Fails with [`AuthFailure::UserNotFound`] when the subject no longer exists, which happens
/// once a user is removed after their token was issued.
#[instrument(skip(store), err)]
pub async fn resolve(store: &dyn UserStore, subject: &str) -> Result<UserDBResponse> {
    match store.find_by_username(subject).await? {
        Some(user) => Ok(user),
        None => {
            debug!("Token subject has no matching user");
            Err(AuthFailure::UserNotFound.into())
        }
    }
}

/// Reject users whose account is disabled.
///
/// Only `disabled` is consulted. `is_active` is stored and reported but never gates access.
pub fn authorize(user: UserDBResponse) -> Result<UserDBResponse> {
    if user.disabled {
        debug!(user_id = user.id, "Rejected session for disabled account");
        return Err(AuthFailure::AccountDisabled.into());
    }
    Ok(user)
}

/// Resolve and authorize in one step, starting from verified claims
pub async fn load_active_user(store: &dyn UserStore, claims: &Claims) -> Result<UserDBResponse> {
    authorize(resolve(store, &claims.sub).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{
            InMemoryUserStore,
            models::users::{UserCreateDBRequest, UserUpdateDBRequest},
        },
        errors::Error,
    };

    fn create_request(username: &str, is_active: bool, disabled: bool) -> UserCreateDBRequest {
        UserCreateDBRequest {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            full_name: Some("Test User".to_string()),
            is_active,
            disabled,
        }
    }

    fn failure(result: Result<UserDBResponse>) -> AuthFailure {
        match result {
            Err(Error::Auth(failure)) => failure,
            other => panic!("expected an auth failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_existing_user() {
        let store = InMemoryUserStore::new();
        let created = store.create(&create_request("johndoe", true, false)).await.unwrap();

        let user = resolve(&store, "johndoe").await.unwrap();
        assert_eq!(user, created);
    }

    #[tokio::test]
    async fn test_resolve_unknown_subject() {
        let store = InMemoryUserStore::new();
        assert_eq!(failure(resolve(&store, "ghost").await), AuthFailure::UserNotFound);
    }

    #[tokio::test]
    async fn test_authorize_disabled_user() {
        let store = InMemoryUserStore::new();
        let user = store.create(&create_request("alice", true, true)).await.unwrap();

        assert_eq!(failure(authorize(user)), AuthFailure::AccountDisabled);
    }

    #[tokio::test]
    async fn test_inactive_flag_is_not_enforced() {
        let store = InMemoryUserStore::new();
        let user = store.create(&create_request("bob", false, false)).await.unwrap();

        let authorized = authorize(user).unwrap();
        assert!(!authorized.is_active);
    }

    #[tokio::test]
    async fn test_disabling_takes_effect_on_next_load() {
        let store = InMemoryUserStore::new();
        let user = store.create(&create_request("carol", true, false)).await.unwrap();
        let claims = Claims {
            sub: "carol".to_string(),
            exp: i64::MAX,
        };

        assert!(load_active_user(&store, &claims).await.is_ok());

        store.update(user.id, &UserUpdateDBRequest::disabled(true)).await.unwrap();
        assert_eq!(failure(load_active_user(&store, &claims).await), AuthFailure::AccountDisabled);
    }
}
