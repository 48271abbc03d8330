//! Database record models.
//!
//! Models here are distinct from the API models in [`crate::api::models`] so the stored
//! representation (which carries the password hash) can never be serialized by accident.
//!
//! - [`users`]: User accounts and their create/update requests

pub mod users;
