//! # authsvc: username/password authentication with signed bearer tokens
//!
//! `authsvc` is a small HTTP service that registers users, exchanges a username and password for
//! a short-lived signed access token, and resolves that token back to an authorized user on
//! every protected request.
//!
//! ## Overview
//!
//! The service is built from five pieces that each do one job:
//!
//! - the **password hasher** ([`auth::password`]) turns plaintext into salted Argon2id hashes and
//!   checks candidates against them,
//! - the **credential validator** ([`auth::credentials`]) looks a user up and checks their
//!   password, without revealing which of the two failed,
//! - the **token issuer** and **token verifier** ([`auth::token`]) mint and check HMAC-signed
//!   JWTs carrying a subject and an expiry,
//! - the **session resolver** ([`auth::session`]) maps a verified subject back to a stored user
//!   and refuses disabled accounts.
//!
//! Users live behind the [`db::UserStore`] trait, with a PostgreSQL implementation for
//! deployments and an in-memory one for development and tests.
//!
//! ## Request Flow
//!
//! `POST /token` validates the submitted credentials and returns
//! `{"access_token": ..., "token_type": "bearer"}`. Protected routes take a
//! [`auth::current_user::CurrentUser`] extractor, which reads `Authorization: Bearer <token>`,
//! verifies the token, loads the subject and checks that the account is enabled. Every failure is
//! logged with its specific reason and answered with a generic `401` (or `400 Inactive user`), so
//! clients cannot probe which usernames exist.
//!
//! ## Configuration
//!
//! See [`config`] for the YAML file and environment variables. Without any configuration the
//! service listens on `0.0.0.0:8000`, keeps users in memory and signs tokens with a built-in
//! development secret (a warning is logged at startup).

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

use crate::{
    auth::{
        password::PasswordHasher,
        token::{TokenIssuer, TokenVerifier},
    },
    config::DatabaseConfig,
    db::{InMemoryUserStore, PostgresUserStore, UserStore},
    openapi::ApiDoc,
};
use axum::{
    Json, Router,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info, warn};
use utoipa::OpenApi;

pub use types::UserId;

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `config`: Application configuration loaded from environment/files
/// - `users`: The user store
/// - `passwords`: Password hasher configured with the Argon2 cost parameters
/// - `issuer` / `verifier`: Token signing and checking, sharing one secret and algorithm
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .users(Arc::new(InMemoryUserStore::new()))
///     .passwords(PasswordHasher::default())
///     .issuer(TokenIssuer::new(secret, Algorithm::HS256))
///     .verifier(TokenVerifier::new(secret, Algorithm::HS256))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub passwords: PasswordHasher,
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
}

impl AppState {
    /// Build the state from configuration around an already constructed store
    pub fn from_config(config: Config, users: Arc<dyn UserStore>) -> errors::Result<Self> {
        Ok(Self::builder()
            .passwords(PasswordHasher::new(config.auth.native.password.argon2_params()))
            .issuer(TokenIssuer::from_config(&config)?)
            .verifier(TokenVerifier::from_config(&config)?)
            .users(users)
            .config(config)
            .build())
    }
}

/// Get the authsvc database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Apply any pending migrations to the pool
pub async fn run_migrations(pool: &PgPool) -> db::errors::Result<()> {
    migrator().run(pool).await?;
    Ok(())
}

/// Create the configured user store. For PostgreSQL this connects the pool and runs migrations;
/// the pool is returned as well so it can be closed on shutdown.
async fn setup_store(config: &Config) -> anyhow::Result<(Arc<dyn UserStore>, Option<PgPool>)> {
    match &config.database {
        DatabaseConfig::Memory => {
            info!("Using in-memory user store; users will be lost on shutdown");
            Ok((Arc::new(InMemoryUserStore::new()), None))
        }
        DatabaseConfig::External { url, pool } => {
            info!("Using external database");

            let optional_secs = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));
            let pg_pool = PgPoolOptions::new()
                .max_connections(pool.max_connections)
                .min_connections(pool.min_connections)
                .acquire_timeout(Duration::from_secs(pool.acquire_timeout_secs))
                .idle_timeout(optional_secs(pool.idle_timeout_secs))
                .max_lifetime(optional_secs(pool.max_lifetime_secs))
                .connect(url)
                .await?;
            run_migrations(&pg_pool).await?;

            Ok((Arc::new(PostgresUserStore::new(pg_pool.clone())), Some(pg_pool)))
        }
    }
}

/// Build the HTTP router over the given state
pub fn build_router(state: &AppState) -> Router {
    Router::new()
        .route("/token", post(api::handlers::auth::login))
        .route("/users/", post(api::handlers::users::register))
        .route("/users/me/", get(api::handlers::users::read_users_me))
        .route("/users/{id}", get(api::handlers::users::get_user))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state.clone())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Main application struct that owns all resources.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] sets up the user store (connecting and migrating
///    PostgreSQL when configured), the signing keys and the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal is received, in-flight requests finish and the
///    database pool is closed
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting auth service on {}", config.bind_address());

        if config.uses_default_secret() {
            warn!("Using the built-in development secret_key; set SECRET_KEY before deploying");
        }

        let (users, pool) = setup_store(&config).await?;
        let app_state = AppState::from_config(config.clone(), users)?;
        let router = build_router(&app_state);

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Auth service listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        Ok(())
    }
}
