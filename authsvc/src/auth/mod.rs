//! Authentication and authorization.
//!
//! A login exchanges a username and password for a signed, short-lived access token. Every
//! protected request then presents that token as `Authorization: Bearer <token>` and goes
//! through the session pipeline:
//!
//! ```text
//! bearer token ──verify──> claims ──resolve──> user ──authorize──> CurrentUser
//!               (token)             (session)        (session)
//! ```
//!
//! Each stage fails with its own [`AuthFailure`](crate::errors::AuthFailure), so logs show where
//! a request was rejected. The HTTP layer collapses those to generic 401/400 responses.
//!
//! # Modules
//!
//! - [`password`]: Password hashing and verification using Argon2
//! - [`credentials`]: Username/password checks against the user store
//! - [`token`]: Access token issuing and verification
//! - [`session`]: Resolving a token subject to a user and enforcing the disabled flag
//! - [`current_user`]: The axum extractor that runs the session pipeline
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use authsvc::auth::current_user::CurrentUser;
//!
//! async fn protected_handler(CurrentUser(user): CurrentUser) -> String {
//!     format!("Hello, {}!", user.username)
//! }
//! ```

pub mod credentials;
pub mod current_user;
pub mod password;
pub mod session;
pub mod token;
