//! API request and response data models.
//!
//! These structures define the public API contract. They are kept separate from the database
//! models in [`crate::db::models`] so the stored representation (which includes the password
//! hash) never leaks into a response. All models derive `utoipa::ToSchema` for the OpenAPI
//! document.
//!
//! - [`auth`]: Token login form and bearer token response
//! - [`users`]: Registration payload and the public user view

pub mod auth;
pub mod users;
