use crate::db::errors::DbError;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

/// Failure kinds of the authentication protocol.
///
/// These stay distinct inside the service so logs show which stage rejected a request, but are
/// collapsed to a handful of generic responses at the HTTP boundary.
#[derive(ThisError, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Unknown username or wrong password. The two cases are deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Malformed, unsigned, mis-signed token, or one without a subject
    #[error("token is invalid")]
    TokenInvalid,

    /// Signature checks out but the expiry has passed
    #[error("token has expired")]
    TokenExpired,

    /// Token is valid but its subject no longer exists
    #[error("token subject not found")]
    UserNotFound,

    /// Session is valid but the account has the disabled flag set
    #[error("account is disabled")]
    AccountDisabled,

    /// Registration conflict
    #[error("username already registered")]
    DuplicateUsername,
}

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication protocol failure
    #[error(transparent)]
    Auth(#[from] AuthFailure),

    /// No bearer credentials were presented
    #[error("Not authenticated")]
    Unauthenticated,

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Auth(failure) => match failure {
                AuthFailure::InvalidCredentials
                | AuthFailure::TokenInvalid
                | AuthFailure::TokenExpired
                | AuthFailure::UserNotFound => StatusCode::UNAUTHORIZED,
                AuthFailure::AccountDisabled | AuthFailure::DuplicateUsername => StatusCode::BAD_REQUEST,
            },
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Auth(failure) => match failure {
                AuthFailure::InvalidCredentials => "Incorrect username or password".to_string(),
                AuthFailure::TokenInvalid | AuthFailure::TokenExpired | AuthFailure::UserNotFound => {
                    "Could not validate credentials".to_string()
                }
                AuthFailure::AccountDisabled => "Inactive user".to_string(),
                AuthFailure::DuplicateUsername => "Username already registered".to_string(),
            },
            Error::Unauthenticated => "Not authenticated".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { .. } => "Resource already exists".to_string(),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }

    /// Whether the response must carry a `WWW-Authenticate: Bearer` challenge
    fn is_bearer_challenge(&self) -> bool {
        self.status_code() == StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Auth(failure) => {
                tracing::info!(reason = ?failure, "Authentication rejected: {}", self);
            }
            Error::Unauthenticated => {
                tracing::debug!("Request without bearer credentials");
            }
            Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = Json(json!({ "detail": self.user_message() }));
        let mut response = (status, body).into_response();
        if self.is_bearer_challenge() {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
