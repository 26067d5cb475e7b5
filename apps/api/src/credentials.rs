//! Password hashing, verification and reset-password generation.
//!
//! Stored format: `<salt hex>:<derived key hex>`. The salt participates in the KDF as
//! its hex text, so hashes written by the previous Node service keep verifying.

use rand::rngs::OsRng;
use rand::RngCore;
use scrypt::Params;
use subtle::ConstantTimeEq;
use thiserror::Error;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 64;
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Human-friendly alphabet: no `I`, `O`, `i`, `l`, `o`, `0` or `1`.
pub const RESET_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789";
pub const RESET_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("account has no password set")]
    NotSet,

    #[error("key derivation failed: {0}")]
    Kdf(String),
}

fn derive_key(password: &str, salt: &str) -> Result<[u8; KEY_LEN], CredentialError> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|e| CredentialError::Kdf(e.to_string()))?;
    let mut key = [0u8; KEY_LEN];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut key)
        .map_err(|e| CredentialError::Kdf(e.to_string()))?;
    Ok(key)
}

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let salt = hex::encode(salt);
    let key = derive_key(password, &salt)?;
    Ok(format!("{salt}:{}", hex::encode(key)))
}

/// Checks `password` against a stored `salt:key` hash.
///
/// Malformed hashes verify as `false`. An empty stored hash is an account
/// misconfiguration and is reported as [`CredentialError::NotSet`].
pub fn verify_password(password: &str, stored: &str) -> Result<bool, CredentialError> {
    let stored = stored.trim();
    if stored.is_empty() {
        return Err(CredentialError::NotSet);
    }

    let Some((salt, key_hex)) = stored.split_once(':') else {
        return Ok(false);
    };
    let Ok(expected) = hex::decode(key_hex) else {
        return Ok(false);
    };
    if salt.is_empty() || expected.len() != KEY_LEN {
        return Ok(false);
    }

    let derived = derive_key(password, salt)?;
    Ok(bool::from(derived.as_slice().ct_eq(expected.as_slice())))
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String, CredentialError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| CredentialError::Kdf(e.to_string()))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(
    password: String,
    stored: String,
) -> Result<bool, CredentialError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| CredentialError::Kdf(e.to_string()))?
}

/// Generates a one-time plaintext password for a coach-initiated reset.
pub fn generate_reset_password() -> String {
    let mut bytes = [0u8; RESET_PASSWORD_LEN];
    OsRng.fill_bytes(&mut bytes);
    bytes
        .iter()
        .map(|b| RESET_ALPHABET[usize::from(*b) % RESET_ALPHABET.len()] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hash_then_verify_succeeds() {
        let stored = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &stored).unwrap());
    }

    #[test]
    fn test_wrong_password_fails() {
        let stored = hash_password("correct horse").unwrap();
        assert!(!verify_password("battery staple", &stored).unwrap());
    }

    #[test]
    fn test_hash_uses_fresh_salt() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b, "two hashes of one password must differ");
        assert!(verify_password("same", &a).unwrap());
        assert!(verify_password("same", &b).unwrap());
    }

    #[test]
    fn test_stored_format_is_salt_colon_key() {
        let stored = hash_password("pw").unwrap();
        let (salt, key) = stored.split_once(':').unwrap();
        assert_eq!(salt.len(), SALT_LEN * 2);
        assert_eq!(key.len(), KEY_LEN * 2);
        assert!(stored.chars().all(|c| c == ':' || c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_salt_is_used_as_hex_text() {
        // Same derivation as the previous service: scrypt(password, salt_hex_string).
        let salt = "00112233445566778899aabbccddeeff";
        let key = derive_key("pw", salt).unwrap();
        let stored = format!("{salt}:{}", hex::encode(key));
        assert!(verify_password("pw", &stored).unwrap());
    }

    #[test]
    fn test_malformed_hashes_verify_false() {
        for stored in ["nocolon", "salt:not-hex", "salt:abcd", ":", "abc:"] {
            assert!(
                !verify_password("pw", stored).unwrap(),
                "{stored:?} should verify false"
            );
        }
    }

    #[test]
    fn test_empty_hash_is_an_error() {
        assert!(matches!(
            verify_password("pw", ""),
            Err(CredentialError::NotSet)
        ));
        assert!(matches!(
            verify_password("pw", "   "),
            Err(CredentialError::NotSet)
        ));
    }

    #[test]
    fn test_reset_password_shape() {
        let pw = generate_reset_password();
        assert_eq!(pw.chars().count(), RESET_PASSWORD_LEN);
        assert!(pw.bytes().all(|b| RESET_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_reset_passwords_stay_in_alphabet_and_vary() {
        let passwords: Vec<String> = (0..1000).map(|_| generate_reset_password()).collect();
        for pw in &passwords {
            assert_eq!(pw.len(), RESET_PASSWORD_LEN);
            assert!(pw.bytes().all(|b| RESET_ALPHABET.contains(&b)), "{pw}");
        }

        let distinct: HashSet<&String> = passwords.iter().collect();
        assert!(distinct.len() > 990, "only {} distinct", distinct.len());

        let single_char = passwords
            .iter()
            .filter(|pw| pw.bytes().all(|b| b == pw.as_bytes()[0]))
            .count();
        assert_eq!(single_char, 0);
    }

    #[test]
    fn test_alphabet_excludes_ambiguous_characters() {
        for c in [b'I', b'O', b'l', b'o', b'i', b'0', b'1'] {
            assert!(!RESET_ALPHABET.contains(&c));
        }
        assert_eq!(RESET_ALPHABET.len(), 55);
    }
}
