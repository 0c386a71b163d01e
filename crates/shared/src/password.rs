//! Password hashing for stored user credentials.
//!
//! Passwords are stored as salted Argon2id hashes in PHC string format. The PHC
//! string carries its own parameters, so hashes produced with older settings
//! keep verifying after the parameters below change.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Argon2id cost settings (OWASP 2024 baseline).
const MEMORY_COST: u32 = 19456; // KiB
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

/// Prefix shared by every hash this module produces.
const PHC_PREFIX: &str = "$argon2id$";

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("invalid Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a plaintext password with a fresh random salt.
///
/// ```
/// use shared::password::hash_password;
///
/// let hash = hash_password("correct horse").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Checks a candidate password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch and an error only when the stored value is
/// not a usable hash.
pub fn verify_password(candidate: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    // Parameters come from the PHC string, not from `hasher()`.
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Returns true when the value already looks like a hash produced by
/// [`hash_password`].
pub fn is_password_hash(value: &str) -> bool {
    value.starts_with(PHC_PREFIX) && PasswordHash::new(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_configured_params() {
        let hash = hash_password("clinic-admin-1").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let first = hash_password("repeat me").unwrap();
        let second = hash_password("repeat me").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("repeat me", &first).unwrap());
        assert!(verify_password("repeat me", &second).unwrap());
    }

    #[test]
    fn test_verify_rejects_other_password() {
        let hash = hash_password("old-password").unwrap();
        assert!(!verify_password("new-password", &hash).unwrap());
    }

    #[test]
    fn test_verify_unicode_password() {
        let hash = hash_password("pässwörd-密码").unwrap();
        assert!(verify_password("pässwörd-密码", &hash).unwrap());
        assert!(!verify_password("passwort", &hash).unwrap());
    }

    #[test]
    fn test_verify_with_garbage_hash() {
        let result = verify_password("anything", "plaintext-not-a-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_is_password_hash() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(is_password_hash(&hash));
        assert!(!is_password_hash("s3cret!"));
        assert!(!is_password_hash("$argon2id$broken"));
        assert!(!is_password_hash(""));
    }
}
