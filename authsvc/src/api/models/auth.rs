//! API request/response models for token login.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// OAuth2 password grant form, sent as `application/x-www-form-urlencoded`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
    /// Must be `password` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_type: Option<String>,
    #[serde(default)]
    pub scope: String,
}

/// Bearer token returned by a successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Token {
    pub access_token: String,
    /// Always `bearer`
    pub token_type: String,
}

impl Token {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
