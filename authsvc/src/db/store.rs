//! The user store seam between the authentication core and persistence.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crate::db::{
    errors::Result,
    handlers::{Repository, UserFilter, Users},
    models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use crate::types::UserId;

/// Lookup and mutation of user records.
///
/// Implementations enforce username uniqueness (reporting
/// [`DbError::UniqueViolation`](crate::db::errors::DbError::UniqueViolation)) and give
/// read-your-writes consistency. Every call is a single self-contained operation.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserDBResponse>>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>>;

    async fn create(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse>;

    /// Fails with [`DbError::NotFound`](crate::db::errors::DbError::NotFound) for an unknown id
    async fn update(&self, id: UserId, request: &UserUpdateDBRequest) -> Result<UserDBResponse>;

    async fn list(&self, filter: &UserFilter) -> Result<Vec<UserDBResponse>>;
}

/// PostgreSQL-backed store.
///
/// Each operation acquires one pooled connection, runs a single statement through the
/// [`Users`] repository and returns the connection to the pool when the guard drops, on
/// success and error paths alike.
#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut conn).get_user_by_username(username).await
    }

    #[instrument(skip(self), err)]
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut conn).get_by_id(id).await
    }

    #[instrument(skip_all, fields(username = %request.username), err)]
    async fn create(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut conn).create(request).await
    }

    #[instrument(skip(self, request), err)]
    async fn update(&self, id: UserId, request: &UserUpdateDBRequest) -> Result<UserDBResponse> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut conn).update(id, request).await
    }

    #[instrument(skip(self), err)]
    async fn list(&self, filter: &UserFilter) -> Result<Vec<UserDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut conn).list(filter).await
    }
}
