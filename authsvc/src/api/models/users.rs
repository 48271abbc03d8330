//! API request/response models for users.

use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn default_true() -> bool {
    true
}

// User request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCreate {
    pub username: String,
    /// Plaintext password; only its hash is stored
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub disabled: bool,
}

// User response models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub disabled: bool,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            full_name: db.full_name,
            is_active: db.is_active,
            disabled: db.disabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_user_create_defaults() {
        let request: UserCreate = serde_json::from_value(json!({ "username": "johndoe", "password": "secret1" })).unwrap();

        assert_eq!(request.full_name, None);
        assert!(request.is_active);
        assert!(!request.disabled);
    }

    #[test]
    fn test_response_never_carries_the_hash() {
        let now = Utc::now();
        let response = UserResponse::from(UserDBResponse {
            id: 1,
            username: "johndoe".to_string(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
            full_name: Some("John Doe".to_string()),
            is_active: true,
            disabled: false,
            created_at: now,
            updated_at: now,
        });

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "username": "johndoe",
                "full_name": "John Doe",
                "is_active": true,
                "disabled": false,
            })
        );
    }
}
