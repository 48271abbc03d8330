//! Repository implementations for database access.
//!
//! Each repository wraps a single SQLx connection, provides strongly-typed operations and
//! returns models from [`crate::db::models`]. Repositories are never held across requests:
//! [`crate::db::PostgresUserStore`] acquires a connection, builds the repository, runs one
//! operation and drops both.
//!
//! ```ignore
//! use authsvc::db::handlers::{Users, Repository};
//!
//! let mut conn = pool.acquire().await?;
//! let mut repo = Users::new(&mut conn);
//! let user = repo.get_user_by_username("alice").await?;
//! ```

pub mod repository;
pub mod users;

pub use repository::Repository;
pub use users::{UserFilter, Users};
