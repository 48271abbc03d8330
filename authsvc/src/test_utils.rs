//! Test utilities shared by handler and extractor tests.

use std::sync::Arc;

use axum_test::TestServer;

use crate::{
    AppState,
    auth::password::test_hasher,
    config::Config,
    db::{InMemoryUserStore, UserStore as _, models::users::{UserCreateDBRequest, UserDBResponse}},
};

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

pub fn create_test_config() -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: TEST_SECRET.to_string(),
        ..Default::default()
    };

    // Cheap hashing keeps the HTTP tests fast
    let password = &mut config.auth.native.password;
    password.argon2_memory_kib = 8;
    password.argon2_iterations = 1;
    password.argon2_parallelism = 1;

    config
}

/// State over an empty in-memory store
pub fn create_test_state() -> AppState {
    AppState::from_config(create_test_config(), Arc::new(InMemoryUserStore::new())).expect("Failed to build test state")
}

pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(crate::build_router(&state)).expect("Failed to create test server")
}

pub async fn create_test_user(state: &AppState, username: &str, password: &str, disabled: bool) -> UserDBResponse {
    state
        .users
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            password_hash: test_hasher().hash(password).expect("Failed to hash password"),
            full_name: None,
            is_active: true,
            disabled,
        })
        .await
        .expect("Failed to create test user")
}
