//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The
//! configuration file path defaults to `config.yaml` but can be specified via `-f` flag or
//! `AUTHSVC_CONFIG` environment variable. A missing file is not an error; every field has a
//! default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `AUTHSVC_` override YAML values
//! 3. **Well-known variables** - `SECRET_KEY`, `ALGORITHM`, `ACCESS_TOKEN_EXPIRE_MINUTES` and
//!    `DATABASE_URL` are read without prefix
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `AUTHSVC_AUTH__NATIVE__ALLOW_REGISTRATION=false`.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Signing configuration
//! SECRET_KEY="$(openssl rand -hex 32)"
//! ALGORITHM=HS256
//! ACCESS_TOKEN_EXPIRE_MINUTES=30
//!
//! # Switch from the in-memory store to PostgreSQL
//! DATABASE_URL="postgresql://root:@localhost/defaultdb"
//!
//! # Override server port
//! AUTHSVC_PORT=8080
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::{str::FromStr, time::Duration};

use crate::auth::password::Argon2Params;
use crate::errors::Error;

/// Development fallback for `secret_key`. A warning is logged at startup while it is in use.
pub const DEFAULT_SECRET_KEY: &str = "a8c78182ee3e4122d0ffe62784ba7a403d874de11e538abd475fe91ca0542658";

/// Upper bound for `access_token_expire_minutes` (ten years)
pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: u64 = 60 * 24 * 365 * 10;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "AUTHSVC_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Symmetric secret used to sign and verify access tokens
    #[serde(deserialize_with = "deserialize_secret")]
    pub secret_key: String,
    /// Token signing algorithm; one of HS256, HS384, HS512
    pub algorithm: String,
    /// Lifetime of tokens issued by the login endpoint, in minutes
    pub access_token_expire_minutes: u64,
    /// Set from `DATABASE_URL`; switches `database` to an external PostgreSQL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// User store backend
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
}

/// Connection pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
    /// Time before idle connections are closed (seconds, 0 = never)
    pub idle_timeout_secs: u64,
    /// Maximum lifetime of a connection (seconds, 0 = never)
    pub max_lifetime_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,  // 10 minutes
            max_lifetime_secs: 1800, // 30 minutes
        }
    }
}

/// User store configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatabaseConfig {
    /// Keep users in process memory (lost on restart)
    #[default]
    Memory,
    /// Use external PostgreSQL database
    External {
        /// Connection string
        url: String,
        #[serde(default)]
        pool: PoolSettings,
    },
}

/// Secrets made only of digits arrive from YAML or prefixed env vars as numbers
fn deserialize_secret<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Secret {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    Ok(match Secret::deserialize(deserializer)? {
        Secret::Text(s) => s,
        Secret::Unsigned(n) => n.to_string(),
        Secret::Signed(n) => n.to_string(),
        Secret::Float(n) => n.to_string(),
    })
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Native username/password authentication
    pub native: NativeAuthConfig,
}

/// Native username/password authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NativeAuthConfig {
    /// Allow new users to self-register
    pub allow_registration: bool,
    /// Password validation rules
    pub password: PasswordConfig,
}

/// Password validation rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Argon2 memory cost in KiB (default: 19456 KiB = 19 MB, secure for production)
    pub argon2_memory_kib: u32,
    /// Argon2 iterations (default: 2, secure for production)
    pub argon2_iterations: u32,
    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
            database_url: None,
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for NativeAuthConfig {
    fn default() -> Self {
        Self {
            allow_registration: true,
            password: PasswordConfig::default(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let argon2 = Argon2Params::default();
        Self {
            min_length: 1,
            max_length: 256,
            argon2_memory_kib: argon2.memory_kib,
            argon2_iterations: argon2.iterations,
            argon2_parallelism: argon2.parallelism,
        }
    }
}

impl PasswordConfig {
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // if database_url is set, use it (preserving existing pool settings)
        if let Some(url) = config.database_url.take() {
            let pool = match &config.database {
                DatabaseConfig::External { pool, .. } => pool.clone(),
                DatabaseConfig::Memory => PoolSettings::default(),
            };
            config.database = DatabaseConfig::External { url, pool };
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.secret_key.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: secret_key must not be empty. \
                     Set the SECRET_KEY environment variable or add secret_key to the config file."
                    .to_string(),
            });
        }

        self.jwt_algorithm()?;

        if self.access_token_expire_minutes == 0 {
            return Err(Error::Internal {
                operation: "Config validation: access_token_expire_minutes must be greater than zero".to_string(),
            });
        }
        if self.access_token_expire_minutes > MAX_ACCESS_TOKEN_EXPIRE_MINUTES {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: access_token_expire_minutes ({}) cannot be greater than {MAX_ACCESS_TOKEN_EXPIRE_MINUTES}",
                    self.access_token_expire_minutes
                ),
            });
        }

        let password = &self.auth.native.password;
        if password.min_length > password.max_length {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: Invalid password configuration: min_length ({}) cannot be greater than max_length ({})",
                    password.min_length, password.max_length
                ),
            });
        }
        password.argon2_params().validate()?;

        Ok(())
    }

    /// The configured signing algorithm. Only the HMAC family works with a shared secret.
    pub fn jwt_algorithm(&self) -> Result<Algorithm, Error> {
        match Algorithm::from_str(&self.algorithm) {
            Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
            _ => Err(Error::Internal {
                operation: format!(
                    "Config validation: unsupported algorithm '{}', expected one of HS256, HS384, HS512",
                    self.algorithm
                ),
            }),
        }
    }

    /// Lifetime of tokens handed out by the login endpoint
    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_expire_minutes.saturating_mul(60))
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }

    pub fn figment(args: &Args) -> Figment {
        let figment = Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("AUTHSVC_").ignore(&["config"]).split("__"))
            // Unprefixed names shared with other deployments of this service
            .merge(Env::raw().only(&["ALGORITHM", "ACCESS_TOKEN_EXPIRE_MINUTES", "DATABASE_URL"]));

        // Taken verbatim, so a secret like "000123" is not parsed into a number
        match std::env::var("SECRET_KEY") {
            Ok(secret) => figment.merge(Serialized::default("secret_key", secret)),
            Err(_) => figment,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
