//! Cryptographic Utilities
//!
//! Signed tokens have the shape `"{message}.{base64url(HMAC-SHA256(secret, message))}"`.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Signed token could not be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Malformed signed token")]
    Malformed,
    #[error("Signature mismatch")]
    BadSignature,
}

/// Generate cryptographically secure random bytes
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Encode bytes as URL-safe base64 without padding
pub fn to_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode URL-safe base64 without padding
pub fn from_base64url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(s)
}

/// HMAC-SHA256 of `message`, base64url encoded
pub fn sign(secret: &[u8], message: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    to_base64url(&mac.finalize().into_bytes())
}

/// Constant-time check of a base64url signature over `message`
pub fn verify(secret: &[u8], message: &str, signature: &str) -> bool {
    let Ok(signature) = from_base64url(signature) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    mac.verify_slice(&signature).is_ok()
}

/// Derive a purpose-bound key from `secret`
///
/// Keys derived with different labels never accept each other's signatures.
pub fn derive_key(secret: &[u8], label: &str) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(label.as_bytes());
    mac.finalize().into_bytes().into()
}

/// Append a signature to `message`
pub fn seal(secret: &[u8], message: &str) -> String {
    format!("{}.{}", message, sign(secret, message))
}

/// Verify a sealed token and return the message part
///
/// The signature is everything after the last `.`.
pub fn open<'a>(secret: &[u8], token: &'a str) -> Result<&'a str, TokenError> {
    let (message, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
    if message.is_empty() || signature.is_empty() {
        return Err(TokenError::Malformed);
    }
    if verify(secret, message, signature) {
        Ok(message)
    } else {
        Err(TokenError::BadSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_values() {
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);

        let hash = sha256(b"hello");
        let expected =
            hex::decode("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);
    }

    #[test]
    fn test_random_bytes() {
        let a: [u8; 32] = random_bytes();
        let b: [u8; 32] = random_bytes();
        assert!(a.iter().any(|&byte| byte != 0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_key_separates_purposes() {
        let secret = [9u8; 32];
        let verify_key = derive_key(&secret, "verify-email");

        assert_eq!(verify_key, derive_key(&secret, "verify-email"));
        assert_ne!(verify_key, derive_key(&secret, "session"));
        assert_ne!(verify_key, secret);

        let sig = sign(&secret, "message");
        assert!(!verify(&verify_key, "message", &sig));
    }

    #[test]
    fn test_base64url_has_no_padding() {
        let encoded = to_base64url(b"ab");
        assert!(!encoded.contains('='));
        assert_eq!(from_base64url(&encoded).unwrap(), b"ab");
    }

    #[test]
    fn test_hmac_rfc4231_case_2() {
        // RFC 4231 test case 2
        let mac = sign(b"Jefe", "what do ya want for nothing?");
        let expected =
            hex::decode("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
                .unwrap();
        assert_eq!(from_base64url(&mac).unwrap(), expected);
    }

    #[test]
    fn test_verify() {
        let key = [42u8; 32];
        let sig = sign(&key, "message");
        assert!(verify(&key, "message", &sig));
        assert!(!verify(&key, "other", &sig));
        assert!(!verify(&[7u8; 32], "message", &sig));
        assert!(!verify(&key, "message", "!!not base64!!"));
    }

    #[test]
    fn test_seal_open() {
        let key = [1u8; 32];
        let token = seal(&key, "abc.def");
        assert_eq!(open(&key, &token), Ok("abc.def"));
    }

    #[test]
    fn test_open_rejects_tampering() {
        let key = [1u8; 32];
        let token = seal(&key, "session");
        let tampered = token.replacen("session", "sessioN", 1);

        assert_eq!(open(&key, &tampered), Err(TokenError::BadSignature));
        assert_eq!(open(&key, "no-dot"), Err(TokenError::Malformed));
        assert_eq!(open(&key, ".sig"), Err(TokenError::Malformed));
    }
}
