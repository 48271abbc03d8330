//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # Routes
//!
//! - `POST /token`: exchange a username and password (form encoded) for a bearer token
//! - `POST /users/`: register a user
//! - `GET /users/me/`: the user behind the presented token
//! - `GET /users/{id}`: any user by ID, for authenticated callers
//! - `GET /openapi.json`: the OpenAPI document for the routes above

pub mod handlers;
pub mod models;
