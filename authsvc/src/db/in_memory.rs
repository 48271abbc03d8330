//! In-memory user store.
//!
//! Keeps all users in a map guarded by a single lock, so the uniqueness check and insert in
//! [`UserStore::create`] happen atomically. Suitable for development and tests; users are lost
//! on restart.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::db::{
    errors::{DbError, Result},
    handlers::UserFilter,
    models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    store::UserStore,
};
use crate::types::UserId;

#[derive(Default)]
struct Inner {
    next_id: UserId,
    users: BTreeMap<UserId, UserDBResponse>,
}

#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserDBResponse>> {
        let inner = self.inner.read();
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        Ok(self.inner.read().users.get(&id).cloned())
    }

    async fn create(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let mut inner = self.inner.write();

        if inner.users.values().any(|u| u.username == request.username) {
            return Err(DbError::UniqueViolation {
                constraint: Some("users_username_key".to_string()),
                table: Some("users".to_string()),
                message: format!("username '{}' already exists", request.username),
            });
        }

        inner.next_id += 1;
        let now = Utc::now();
        let user = UserDBResponse {
            id: inner.next_id,
            username: request.username.clone(),
            password_hash: request.password_hash.clone(),
            full_name: request.full_name.clone(),
            is_active: request.is_active,
            disabled: request.disabled,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: UserId, request: &UserUpdateDBRequest) -> Result<UserDBResponse> {
        let mut inner = self.inner.write();
        let user = inner.users.get_mut(&id).ok_or(DbError::NotFound)?;

        if let Some(full_name) = &request.full_name {
            user.full_name = Some(full_name.clone());
        }
        if let Some(is_active) = request.is_active {
            user.is_active = is_active;
        }
        if let Some(disabled) = request.disabled {
            user.disabled = disabled;
        }
        if let Some(password_hash) = &request.password_hash {
            user.password_hash = password_hash.clone();
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<UserDBResponse>> {
        let inner = self.inner.read();
        Ok(inner
            .users
            .values()
            .skip(filter.skip.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(username: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            full_name: None,
            is_active: true,
            disabled: false,
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let store = InMemoryUserStore::new();
        let a = store.create(&create_request("a")).await.unwrap();
        let b = store.create(&create_request("b")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_lookup_by_username_and_id() {
        let store = InMemoryUserStore::new();
        let created = store.create(&create_request("alice")).await.unwrap();

        assert_eq!(store.find_by_username("alice").await.unwrap(), Some(created.clone()));
        assert_eq!(store.find_by_id(created.id).await.unwrap(), Some(created));
        assert!(store.find_by_username("bob").await.unwrap().is_none());
        assert!(store.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = InMemoryUserStore::new();
        store.create(&create_request("alice")).await.unwrap();

        let err = store.create(&create_request("alice")).await.unwrap_err();
        assert!(err.is_duplicate_username());
        assert_eq!(store.list(&UserFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_leaves_unset_fields() {
        let store = InMemoryUserStore::new();
        let created = store.create(&create_request("alice")).await.unwrap();

        let updated = store.update(created.id, &UserUpdateDBRequest::disabled(true)).await.unwrap();
        assert!(updated.disabled);
        assert!(updated.is_active);
        assert_eq!(updated.password_hash, "hash");
        assert_eq!(store.find_by_id(created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let store = InMemoryUserStore::new();
        let result = store.update(7, &UserUpdateDBRequest::disabled(true)).await;
        assert!(matches!(result, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_paginates_in_id_order() {
        let store = InMemoryUserStore::new();
        for name in ["a", "b", "c", "d"] {
            store.create(&create_request(name)).await.unwrap();
        }

        let page: Vec<_> = store
            .list(&UserFilter::new(1, 2))
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(page, vec!["b", "c"]);
    }
}
