//! Username/password authentication against the user store.

use tracing::{debug, instrument};

use crate::{
    auth::password::PasswordHasher,
    db::{UserStore, models::users::UserDBResponse},
    errors::{AuthFailure, Error, Result},
};

/// Look up `username` and check `password` against its stored hash.
///
/// An unknown username and a wrong password fail identically with
/// [`AuthFailure::InvalidCredentials`], and both pay for one Argon2 computation. Disabled accounts
/// still authenticate here; that flag is enforced when a session is authorized. Store failures
/// propagate unchanged.
#[instrument(skip(store, hasher, password))]
pub async fn authenticate(
    store: &dyn UserStore,
    hasher: &PasswordHasher,
    username: &str,
    password: &str,
) -> Result<UserDBResponse> {
    let user = store.find_by_username(username).await?;

    // Password verification is CPU-intensive, so run it off the async runtime
    let hasher = *hasher;
    let password = password.to_string();
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let is_valid = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => hasher.verify(&password, &hash),
        None => hasher.verify_absent(&password),
    })
    .await
    .map_err(|e| Error::Internal {
        operation: format!("spawn password verification task: {e}"),
    })?;

    match user {
        Some(user) if is_valid => Ok(user),
        Some(_) => {
            debug!("Login attempt with wrong password");
            Err(AuthFailure::InvalidCredentials.into())
        }
        None => {
            debug!("Login attempt for unknown user");
            Err(AuthFailure::InvalidCredentials.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::{Argon2Params, test_hasher};
    use std::time::{Duration, Instant};
    use crate::db::{InMemoryUserStore, models::users::UserCreateDBRequest};

    async fn store_with_user(hasher: &PasswordHasher, username: &str, password: &str, disabled: bool) -> InMemoryUserStore {
        let store = InMemoryUserStore::new();
        store
            .create(&UserCreateDBRequest {
                username: username.to_string(),
                password_hash: hasher.hash(password).unwrap(),
                full_name: None,
                is_active: true,
                disabled,
            })
            .await
            .unwrap();
        store
    }

    fn assert_invalid_credentials(result: Result<UserDBResponse>) {
        match result {
            Err(Error::Auth(AuthFailure::InvalidCredentials)) => {}
            other => panic!("expected InvalidCredentials, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_correct_password() {
        let hasher = test_hasher();
        let store = store_with_user(&hasher, "johndoe", "secret1", false).await;

        let user = authenticate(&store, &hasher, "johndoe", "secret1").await.unwrap();
        assert_eq!(user.username, "johndoe");
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let hasher = test_hasher();
        let store = store_with_user(&hasher, "johndoe", "secret1", false).await;

        let wrong_password = authenticate(&store, &hasher, "johndoe", "wrong").await;
        let unknown_user = authenticate(&store, &hasher, "janedoe", "secret1").await;

        assert_eq!(
            wrong_password.as_ref().unwrap_err().user_message(),
            unknown_user.as_ref().unwrap_err().user_message()
        );
        assert_invalid_credentials(wrong_password);
        assert_invalid_credentials(unknown_user);
    }

    #[tokio::test]
    async fn test_unknown_user_costs_as_much_as_wrong_password() {
        // Enough work per hash that a skipped Argon2 run stands out against scheduling noise
        let hasher = PasswordHasher::new(Argon2Params {
            memory_kib: 4096,
            iterations: 3,
            parallelism: 1,
        });
        let store = store_with_user(&hasher, "johndoe", "secret1", false).await;

        let mut wrong_password = Duration::MAX;
        let mut unknown_user = Duration::MAX;
        for _ in 0..3 {
            let start = Instant::now();
            assert_invalid_credentials(authenticate(&store, &hasher, "johndoe", "wrong").await);
            wrong_password = wrong_password.min(start.elapsed());

            let start = Instant::now();
            assert_invalid_credentials(authenticate(&store, &hasher, "janedoe", "wrong").await);
            unknown_user = unknown_user.min(start.elapsed());
        }

        assert!(
            unknown_user * 4 >= wrong_password,
            "unknown user took {unknown_user:?}, wrong password took {wrong_password:?}"
        );
    }

    #[tokio::test]
    async fn test_username_is_case_sensitive() {
        let hasher = test_hasher();
        let store = store_with_user(&hasher, "johndoe", "secret1", false).await;

        assert_invalid_credentials(authenticate(&store, &hasher, "JohnDoe", "secret1").await);
    }

    #[tokio::test]
    async fn test_disabled_user_still_authenticates() {
        let hasher = test_hasher();
        let store = store_with_user(&hasher, "alice", "pw", true).await;

        let user = authenticate(&store, &hasher, "alice", "pw").await.unwrap();
        assert!(user.disabled);
    }

    #[tokio::test]
    async fn test_corrupt_stored_hash_fails_closed() {
        let hasher = test_hasher();
        let store = InMemoryUserStore::new();
        store
            .create(&UserCreateDBRequest {
                username: "bob".to_string(),
                password_hash: "not-a-hash".to_string(),
                full_name: None,
                is_active: true,
                disabled: false,
            })
            .await
            .unwrap();

        assert_invalid_credentials(authenticate(&store, &hasher, "bob", "not-a-hash").await);
    }
}
