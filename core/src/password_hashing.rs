//! Salted password hashing with PBKDF2.
//!
//! Passwords are never stored. A random salt is generated per credential and
//! PBKDF2-HMAC derives a fixed-length hash from the password and the salt.
//! Verification re-derives the hash with the same salt, iteration count and
//! digest, then compares in constant time.
//!
//! All four parameters (salt, hash, iterations, algorithm) must be persisted
//! together; [`HashedSecret`] bundles them.
//!
//! # Example
//!
//! ```
//! use webapi_core::{HashAlgorithm, PasswordHashingService, Pbkdf2PasswordHashingService};
//!
//! let service = Pbkdf2PasswordHashingService;
//! let (salt, hash) = service
//!     .hash_password("correct horse", 16, 32, 1_000, HashAlgorithm::Sha256)
//!     .unwrap();
//!
//! assert!(service
//!     .test_password("correct horse", &salt, &hash, 1_000, HashAlgorithm::Sha256)
//!     .unwrap());
//! ```

use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Digest used inside PBKDF2's HMAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HashAlgorithm {
    /// HMAC-SHA1 (legacy credentials only)
    Sha1,
    /// HMAC-SHA256
    Sha256,
    /// HMAC-SHA384
    Sha384,
    /// HMAC-SHA512
    Sha512,
}

impl HashAlgorithm {
    /// Stable identifier for persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
        }
    }

    fn derive(self, password: &[u8], salt: &[u8], iterations: u32, output: &mut [u8]) {
        match self {
            Self::Sha1 => pbkdf2::pbkdf2_hmac::<sha1::Sha1>(password, salt, iterations, output),
            Self::Sha256 => pbkdf2::pbkdf2_hmac::<sha2::Sha256>(password, salt, iterations, output),
            Self::Sha384 => pbkdf2::pbkdf2_hmac::<sha2::Sha384>(password, salt, iterations, output),
            Self::Sha512 => pbkdf2::pbkdf2_hmac::<sha2::Sha512>(password, salt, iterations, output),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised for invalid hashing parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordHashingError {
    /// PBKDF2 requires at least one iteration.
    #[error("Iteration count must be positive.")]
    InvalidIterations,
}

/// Hashes and verifies passwords.
pub trait PasswordHashingService: Send + Sync {
    /// Generate a random salt of `salt_len` bytes and derive a hash of
    /// `hash_len` bytes from `password`.
    ///
    /// Returns `(salt, hash)`.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashingError::InvalidIterations`] if `iterations` is zero.
    fn hash_password(
        &self,
        password: &str,
        salt_len: usize,
        hash_len: usize,
        iterations: u32,
        algorithm: HashAlgorithm,
    ) -> Result<(Vec<u8>, Vec<u8>), PasswordHashingError>;

    /// Re-derive a hash of `expected_hash.len()` bytes and compare it with
    /// `expected_hash` in constant time.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashingError::InvalidIterations`] if `iterations` is zero.
    fn test_password(
        &self,
        password: &str,
        salt: &[u8],
        expected_hash: &[u8],
        iterations: u32,
        algorithm: HashAlgorithm,
    ) -> Result<bool, PasswordHashingError>;
}

/// PBKDF2-HMAC implementation of [`PasswordHashingService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Pbkdf2PasswordHashingService;

impl PasswordHashingService for Pbkdf2PasswordHashingService {
    fn hash_password(
        &self,
        password: &str,
        salt_len: usize,
        hash_len: usize,
        iterations: u32,
        algorithm: HashAlgorithm,
    ) -> Result<(Vec<u8>, Vec<u8>), PasswordHashingError> {
        if iterations == 0 {
            return Err(PasswordHashingError::InvalidIterations);
        }

        let mut salt = vec![0u8; salt_len];
        OsRng.fill_bytes(&mut salt);

        let mut hash = vec![0u8; hash_len];
        algorithm.derive(password.as_bytes(), &salt, iterations, &mut hash);

        Ok((salt, hash))
    }

    fn test_password(
        &self,
        password: &str,
        salt: &[u8],
        expected_hash: &[u8],
        iterations: u32,
        algorithm: HashAlgorithm,
    ) -> Result<bool, PasswordHashingError> {
        if iterations == 0 {
            return Err(PasswordHashingError::InvalidIterations);
        }

        let mut actual_hash = vec![0u8; expected_hash.len()];
        algorithm.derive(password.as_bytes(), salt, iterations, &mut actual_hash);

        Ok(constant_time_eq::constant_time_eq(expected_hash, &actual_hash))
    }
}

/// Parameters chosen when a credential is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParameters {
    /// Salt length in bytes
    pub salt_len: usize,
    /// Derived hash length in bytes
    pub hash_len: usize,
    /// PBKDF2 iteration count
    pub iterations: u32,
    /// HMAC digest
    pub algorithm: HashAlgorithm,
}

impl Default for HashingParameters {
    fn default() -> Self {
        Self {
            salt_len: 32,
            hash_len: 32,
            iterations: 600_000,
            algorithm: HashAlgorithm::Sha256,
        }
    }
}

/// A persisted password credential.
///
/// Losing any of the four fields makes verification impossible, so they travel
/// together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashedSecret {
    /// Random salt
    pub salt: Vec<u8>,
    /// PBKDF2 output
    pub hash: Vec<u8>,
    /// Iteration count used for derivation
    pub iterations: u32,
    /// Digest used for derivation
    pub algorithm: HashAlgorithm,
}

impl HashedSecret {
    /// Hash `password` with fresh salt.
    ///
    /// # Errors
    ///
    /// Propagates [`PasswordHashingError`] from `service`.
    pub fn create(
        service: &dyn PasswordHashingService,
        password: &str,
        parameters: HashingParameters,
    ) -> Result<Self, PasswordHashingError> {
        let (salt, hash) = service.hash_password(
            password,
            parameters.salt_len,
            parameters.hash_len,
            parameters.iterations,
            parameters.algorithm,
        )?;

        Ok(Self {
            salt,
            hash,
            iterations: parameters.iterations,
            algorithm: parameters.algorithm,
        })
    }

    /// Check `password` against this credential.
    ///
    /// # Errors
    ///
    /// Propagates [`PasswordHashingError`] from `service`.
    pub fn verify(
        &self,
        service: &dyn PasswordHashingService,
        password: &str,
    ) -> Result<bool, PasswordHashingError> {
        service.test_password(password, &self.salt, &self.hash, self.iterations, self.algorithm)
    }
}
