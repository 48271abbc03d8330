//! HTTP request handlers.
//!
//! - [`auth`]: `POST /token`, the OAuth2 password grant
//! - [`users`]: registration, the current user and lookup by ID
//!
//! Protected handlers take a [`crate::auth::current_user::CurrentUser`] argument. Handlers return
//! [`crate::errors::Error`], which converts to a status code and a `{"detail": ...}` JSON body.

pub mod auth;
pub mod users;
