//! Salted password hashing.
//!
//! Argon2 with a freshly generated salt per call. Hashing is deliberately
//! slow; callers should treat it as a suspension point like a store
//! round-trip.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use thiserror::Error;

/// An argon2 PHC-format password hash.
///
/// The salt is embedded in the string. `Debug` redacts the contents so the
/// hash cannot end up in logs; the raw value is only exposed to the store
/// layer via [`HashedPassword::as_str`].
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Wrap an existing PHC string loaded from the store.
    pub fn from_phc(phc: String) -> Self {
        Self(phc)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("HashedPassword(..)")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    /// The hasher could not produce a digest (entropy exhaustion or broken
    /// parameters). Unrecoverable for the current request.
    #[error("password hashing failed")]
    Hashing,
}

/// Hash `password` with a per-call random salt.
///
/// Output differs across calls for the same input; only [`verify`] can
/// compare against it.
pub fn hash(password: &str) -> Result<HashedPassword, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| HashError::Hashing)?
        .to_string();
    Ok(HashedPassword(phc))
}

/// Verify `password` against a stored hash.
///
/// Recomputes with the salt embedded in the PHC string; argon2 compares the
/// digests in constant time. Mismatches and unparseable hashes return
/// `false`, never an error.
pub fn verify(password: &str, hash: &HashedPassword) -> bool {
    match PasswordHash::new(&hash.0) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
