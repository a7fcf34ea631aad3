//! Password digests for operator accounts.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Lowercase hex SHA-256 of the password text. Always 64 characters,
/// matching the CHAR(64) column it is stored in.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Compares a candidate password against a stored digest without leaking
/// where the two diverge.
pub fn verify_password(candidate: &str, stored_digest: &str) -> bool {
    hash_password(candidate)
        .as_bytes()
        .ct_eq(stored_digest.as_bytes())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_lowercase_hex_sha256() {
        assert_eq!(
            hash_password("admin123"),
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
        );
        assert_eq!(
            hash_password("x"),
            "2d711642b726b04401627ca9fbac32f5c8530fb1903cc4db02258717921a4881"
        );
        assert_eq!(hash_password("").len(), 64);
    }

    #[test]
    fn verify_accepts_only_the_matching_password() {
        let stored = hash_password("secret");
        assert!(verify_password("secret", &stored));
        assert!(!verify_password("wrong", &stored));
        assert!(!verify_password("", &stored));
        assert!(!verify_password("secret", "not-even-a-digest"));
    }
}
