use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

use crate::{
    AppState,
    api::models::users::{UserCreate, UserResponse},
    auth::current_user::CurrentUser,
    db::models::users::UserCreateDBRequest,
    errors::{AuthFailure, Error},
    types::UserId,
};

/// Register a new user account
#[utoipa::path(
    post,
    path = "/users/",
    request_body = UserCreate,
    tag = "users",
    responses(
        (status = 200, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Invalid input, username taken, or registration disabled"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Json(request): Json<UserCreate>) -> Result<Json<UserResponse>, Error> {
    // Check if registration is allowed
    if !state.config.auth.native.allow_registration {
        return Err(Error::BadRequest {
            message: "User registration is disabled".to_string(),
        });
    }

    if request.username.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Username must not be empty".to_string(),
        });
    }

    // Validate password length
    let password_config = &state.config.auth.native.password;
    let password_length = request.password.chars().count();
    if password_length < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if password_length > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    if state.users.find_by_username(&request.username).await?.is_some() {
        return Err(AuthFailure::DuplicateUsername.into());
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let hasher = state.passwords;
    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let create_request = UserCreateDBRequest {
        username: request.username,
        password_hash,
        full_name: request.full_name,
        is_active: request.is_active,
        disabled: request.disabled,
    };

    // A concurrent registration can still win the race between the lookup and the insert
    let created_user = state.users.create(&create_request).await.map_err(|e| {
        if e.is_duplicate_username() {
            Error::from(AuthFailure::DuplicateUsername)
        } else {
            Error::from(e)
        }
    })?;
    info!(user_id = created_user.id, "Registered user");

    Ok(Json(UserResponse::from(created_user)))
}

/// Get the currently authenticated user
#[utoipa::path(
    get,
    path = "/users/me/",
    tag = "users",
    responses(
        (status = 200, description = "The authenticated user", body = UserResponse),
        (status = 400, description = "Inactive user"),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn read_users_me(CurrentUser(current_user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(current_user))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "users",
    params(("user_id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    _current_user: CurrentUser,
) -> Result<Json<UserResponse>, Error> {
    let user = state.users.find_by_id(user_id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: user_id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}
