//! Token generation and one-way digests for verification and reset tokens.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Number of random bytes in a generated token (64 hex characters).
pub const TOKEN_BYTES: usize = 32;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a random hex token suitable for out-of-band delivery.
///
/// Callers store only [`sha256_hex`] of the result.
pub fn generate_secure_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::thread_rng().gen();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex("test"),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_is_deterministic() {
        assert_eq!(sha256_hex("reset-token"), sha256_hex("reset-token"));
        assert_ne!(sha256_hex("reset-token"), sha256_hex("reset-token2"));
    }

    #[test]
    fn test_generate_secure_token_shape() {
        let token = generate_secure_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_secure_token_unique() {
        assert_ne!(generate_secure_token(), generate_secure_token());
    }
}
