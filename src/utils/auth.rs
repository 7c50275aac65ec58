//! Password hashing
//!
//! Hashes are stored as `pbkdf2_sha256$<iterations>$<salt hex>$<hash hex>`
//! with a random salt per password.

use anyhow::{bail, Context, Result};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const SCHEME: &str = "pbkdf2_sha256";
const PBKDF2_ITERATIONS: u32 = 100_000;
const HASH_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut hash);
    hash
}

/// hash a password using pbkdf2-sha256 with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    let hash = derive(password, &salt, PBKDF2_ITERATIONS);
    format!(
        "{}${}${}${}",
        SCHEME,
        PBKDF2_ITERATIONS,
        hex::encode(salt),
        hex::encode(hash)
    )
}

/// verify a password against a stored hash using constant-time comparison
///
/// Errors only when the stored hash is malformed.
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        bail!("Malformed password hash");
    };

    if scheme != SCHEME {
        bail!("Unsupported password hash scheme: {}", scheme);
    }

    let iterations: u32 = iterations.parse().context("Invalid iteration count")?;
    let salt = hex::decode(salt).context("Invalid salt encoding")?;
    let expected = hex::decode(hash).context("Invalid hash encoding")?;

    let computed = derive(password, &salt, iterations);

    Ok(computed.as_slice().ct_eq(expected.as_slice()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("password1");

        assert!(hash.starts_with("pbkdf2_sha256$"));
        assert!(verify_password("password1", &hash).unwrap());
        assert!(!verify_password("password2", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let h1 = hash_password("same");
        let h2 = hash_password("same");

        assert_ne!(h1, h2);
        assert!(verify_password("same", &h1).unwrap());
        assert!(verify_password("same", &h2).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        assert!(verify_password("x", "plaintext").is_err());
        assert!(verify_password("x", "md5$1$aa$bb").is_err());
        assert!(verify_password("x", "pbkdf2_sha256$10$zz$bb").is_err());
    }
}
