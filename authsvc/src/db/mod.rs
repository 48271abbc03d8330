//! Data persistence and access for user records.
//!
//! ```text
//! ┌─────────────┐
//! │  auth core  │  (credentials, session resolver)
//! └──────┬──────┘
//!        │  UserStore trait
//!        ↓
//! ┌─────────────┐      ┌──────────────────┐
//! │ Postgres    │      │ InMemoryUserStore │
//! │ UserStore   │      └──────────────────┘
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries over one connection)
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! - [`store`]: the [`UserStore`] trait and its PostgreSQL implementation
//! - [`in_memory`]: a lock-guarded in-memory implementation for development and tests
//! - [`handlers`]: sqlx repositories
//! - [`models`]: database record structures
//! - [`errors`]: database-specific error types
//!
//! Migrations live in `migrations/` and are embedded by [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod in_memory;
pub mod models;
pub mod store;

pub use in_memory::InMemoryUserStore;
pub use store::{PostgresUserStore, UserStore};
