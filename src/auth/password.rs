//! Salted password hashing for the login simulation.
//!
//! Hashes are stored as `salt$digest`, both hex-encoded, where
//! `digest = SHA-256(salt || password)`. There are no sessions or tokens;
//! verification is the whole of the auth story here.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hash a password under a fresh random 16-byte salt.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().into_bytes();
    let digest = digest_with_salt(&salt, password);
    format!("{}${}", hex::encode(salt), hex::encode(digest))
}

/// Check a password against a stored `salt$digest` hash. Malformed hashes
/// verify as false rather than erroring; a record with a corrupt hash is
/// simply un-loginable.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };
    digest_with_salt(&salt, password).as_slice() == expected.as_slice()
}

fn digest_with_salt(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_round_trip() {
        let hash = hash_password("speak2024");
        assert!(verify_password("speak2024", &hash));
        assert!(!verify_password("speak2025", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-hash"));
        assert!(!verify_password("anything", "zz$zz"));
        assert!(!verify_password("anything", ""));
    }
}
