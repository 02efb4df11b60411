//! Password digest primitive (argon2id).
//!
//! Treated as a black box by the rest of the crate: plaintext in, digest
//! out, and a yes/no verification. Plaintext passwords never leave this
//! module's call frames.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password")]
    Hash(argon2::password_hash::Error),
}

/// Produce an argon2id digest with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(PasswordError::Hash)?;

    Ok(digest.to_string())
}

/// Verify a plaintext password against a stored digest.
///
/// An unparseable digest counts as a failed verification rather than an
/// error, so a corrupted row cannot be distinguished from a wrong password
/// by the caller.
pub fn verify_password(plain: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };

    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let digest = hash_password("hunter2!secret").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(verify_password("hunter2!secret", &digest));
        assert!(!verify_password("wrong-password", &digest));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("hunter2!secret").unwrap();
        let b = hash_password("hunter2!secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_digest_never_verifies() {
        assert!(!verify_password("anything", "not-a-digest"));
    }
}
