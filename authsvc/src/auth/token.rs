//! Signed access token issuing and verification.
//!
//! Tokens are compact JWS strings (`header.payload.signature`) signed with a shared secret.
//! The payload carries the subject (a username) and an expiry in whole seconds since the epoch.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    config::Config,
    errors::{AuthFailure, Error},
};

/// Lifetime used when the caller does not ask for one
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (username)
    pub exp: i64,    // Expiration time
}

/// Wire shape accepted on decode. `sub` is optional here so a token without one is reported as
/// invalid rather than as a parse failure.
#[derive(Deserialize)]
struct UnverifiedClaims {
    #[serde(default)]
    sub: Option<String>,
    exp: i64,
}

/// Mints access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    header: Header,
}

impl TokenIssuer {
    pub fn new(secret: &str, algorithm: Algorithm) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            header: Header::new(algorithm),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self::new(&config.secret_key, config.jwt_algorithm()?))
    }

    /// Issue a token for `subject` that expires after `ttl` (default [`DEFAULT_TOKEN_TTL`]).
    ///
    /// Expiry is truncated to whole seconds, so a sub-second lifetime may already be expired
    /// when it is verified.
    #[instrument(skip(self))]
    pub fn issue(&self, subject: &str, ttl: Option<Duration>) -> Result<String, Error> {
        let ttl = ttl.unwrap_or(DEFAULT_TOKEN_TTL);
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| Error::Internal {
            operation: format!("compute token expiry: {e}"),
        })?;
        let exp = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| Error::Internal {
                operation: "compute token expiry: lifetime out of range".to_string(),
            })?
            .timestamp();

        let claims = Claims {
            sub: subject.to_string(),
            exp,
        };

        encode(&self.header, &claims, &self.key).map_err(|e| Error::Internal {
            operation: format!("create JWT: {e}"),
        })
    }
}

/// Checks access tokens minted by a [`TokenIssuer`] sharing the same secret and algorithm.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // Expiry is compared below without leeway; the library still insists that `exp` exists.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self::new(&config.secret_key, config.jwt_algorithm()?))
    }

    /// Verify the signature, algorithm and expiry of a token and return its claims.
    ///
    /// Fails with [`AuthFailure::TokenInvalid`] for anything that is not a well-formed token signed
    /// with this key and algorithm or that has no subject, and with [`AuthFailure::TokenExpired`]
    /// once `exp` is at or before the current second.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        let token_data = decode::<UnverifiedClaims>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
            // Server errors (500) - key issues, internal failures
            ErrorKind::InvalidEcdsaKey
            | ErrorKind::InvalidRsaKey(_)
            | ErrorKind::RsaFailedSigning
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat
            | ErrorKind::MissingAlgorithm
            | ErrorKind::Crypto(_) => Error::Internal {
                operation: format!("JWT verification: {e}"),
            },

            ErrorKind::ExpiredSignature => AuthFailure::TokenExpired.into(),

            // Everything else was caused by the presented token
            _ => {
                debug!("Rejected token: {e}");
                AuthFailure::TokenInvalid.into()
            }
        })?;

        let UnverifiedClaims { sub, exp } = token_data.claims;

        let sub = match sub {
            Some(sub) if !sub.is_empty() => sub,
            _ => {
                debug!("Rejected token without a subject");
                return Err(AuthFailure::TokenInvalid.into());
            }
        };

        if exp <= Utc::now().timestamp() {
            return Err(AuthFailure::TokenExpired.into());
        }

        Ok(Claims { sub, exp })
    }
}
