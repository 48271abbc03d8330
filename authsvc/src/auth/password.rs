//! Password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng},
};
use tracing::debug;

use crate::errors::Error;

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    /// Create Argon2 instance with these parameters.
    fn to_argon2(self) -> Result<Argon2<'static>, Error> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None).map_err(|e| Error::Internal {
            operation: format!("create argon2 params: {e}"),
        })?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Check that argon2 accepts these parameters
    pub fn validate(self) -> Result<(), Error> {
        self.to_argon2().map(|_| ())
    }
}

impl Default for Argon2Params {
    /// Secure defaults for production (Argon2id RFC recommendations)
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MB
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Salted one-way hashing of user passwords (Argon2id, PHC string output).
///
/// Both operations are CPU-bound by design; async callers should run them on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher {
    params: Argon2Params,
}

impl PasswordHasher {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }

    /// Hash a password with a fresh random salt.
    ///
    /// The same input hashes to a different string on every call.
    pub fn hash(&self, plaintext: &str) -> Result<String, Error> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = self.params.to_argon2()?;

        let hash = argon2.hash_password(plaintext.as_bytes(), &salt).map_err(|e| Error::Internal {
            operation: format!("hash password: {e}"),
        })?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// Uses the parameters embedded in the hash rather than the configured ones, so hashes
    /// survive a change of cost settings. The digest comparison is constant-time. A hash that
    /// does not parse never matches.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Stored password hash is malformed: {e}");
                return false;
            }
        };

        Argon2::default().verify_password(plaintext.as_bytes(), &parsed_hash).is_ok()
    }

    /// Spend the work of one [`verify`](Self::verify) when there is no stored hash to check, so a
    /// lookup miss costs as much as a wrong password. Never matches.
    pub fn verify_absent(&self, plaintext: &str) -> bool {
        if let Err(e) = self.hash(plaintext) {
            debug!("Dummy password hash failed: {e}");
        }
        false
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    // Minimal cost so tests stay fast
    PasswordHasher::new(Argon2Params {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
}
