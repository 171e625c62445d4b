// ============================================
// File: crates/bless-core/src/crypto/signer.rs
// ============================================
//! # Heartbeat Signer
//!
//! ## Creation Reason
//! Computes the `X-Extension-Signature` value the gateway requires on
//! every ping.
//!
//! ## Main Functionality
//! - `Signer::sign`: canonical JSON → HMAC-SHA512 → lowercase hex
//! - `Signer::sign_bytes`: same, over bytes the caller already encoded
//! - `SignedPayload`: body bytes and signature kept together
//!
//! ## Last Modified
//! v0.1.0 - Initial signer implementation

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha512;

use bless_common::SecretKey;

use crate::error::{CoreError, Result};
use crate::protocol::codec::to_canonical_vec;

type HmacSha512 = Hmac<Sha512>;

// ============================================
// Signer
// ============================================

/// Stateless HMAC-SHA512 signer.
///
/// # Example
/// ```
/// use bless_common::SecretKey;
/// use bless_core::{HeartbeatPayload, Signer};
///
/// let secret = SecretKey::new("abc");
/// let first = Signer::sign(&HeartbeatPayload::CONNECTED, &secret).unwrap();
/// let second = Signer::sign(&HeartbeatPayload::CONNECTED, &secret).unwrap();
/// assert_eq!(first, second);
/// assert_eq!(first.len(), 128);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Signer;

impl Signer {
    /// Signs the canonical JSON encoding of `payload`.
    ///
    /// # Errors
    /// Returns `Encoding` if the payload cannot be encoded.
    pub fn sign<T>(payload: &T, secret: &SecretKey) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        let bytes = to_canonical_vec(payload)?;
        Self::sign_bytes(&bytes, secret)
    }

    /// Signs raw bytes.
    ///
    /// # Errors
    /// Returns `InvalidKey` if the MAC rejects the key (HMAC accepts keys
    /// of any length, so this does not happen in practice).
    pub fn sign_bytes(message: &[u8], secret: &SecretKey) -> Result<String> {
        let mut mac = HmacSha512::new_from_slice(secret.expose().as_bytes())
            .map_err(|e| CoreError::InvalidKey { reason: e.to_string() })?;
        mac.update(message);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

// ============================================
// SignedPayload
// ============================================

/// A request body together with the signature over exactly those bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    /// Canonical JSON body.
    pub body: Vec<u8>,
    /// Lowercase hex HMAC-SHA512 of `body`.
    pub signature: String,
}

impl SignedPayload {
    /// Encodes and signs `payload`.
    ///
    /// # Errors
    /// Returns `Encoding` if the payload cannot be encoded.
    pub fn seal<T>(payload: &T, secret: &SecretKey) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let body = to_canonical_vec(payload)?;
        let signature = Signer::sign_bytes(&body, secret)?;
        Ok(Self { body, signature })
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SIGNATURE_SIZE;
    use crate::protocol::messages::HeartbeatPayload;
    use serde_json::json;

    /// HMAC-SHA512(key = "abc", msg = `{"isB7SConnected": true}`).
    const HEARTBEAT_ABC: &str = "41b0a74e0ef4d9e91cf7c2073678d1926379b782e026958731b91a55463c78b5\
                                 20a23f0426f10227906196e74d5c1531cc39298fab23d83fed1750a0cca8ebdb";

    /// HMAC-SHA512(key = "abd", msg = `{"isB7SConnected": true}`).
    const HEARTBEAT_ABD: &str = "9de88c5b6526073bcfe125884ae8a7d62fb4550fd6244dbd581171c1b95fc5a6\
                                 abd74052ecc0107734730506087b5c93ee8e0f004cb26ee91ee77a4e6dba890c";

    #[test]
    fn test_known_vector() {
        let signature = Signer::sign(&HeartbeatPayload::CONNECTED, &SecretKey::new("abc")).unwrap();
        assert_eq!(signature, HEARTBEAT_ABC);
    }

    #[test]
    fn test_secret_changes_signature() {
        let abd = Signer::sign(&HeartbeatPayload::CONNECTED, &SecretKey::new("abd")).unwrap();
        assert_eq!(abd, HEARTBEAT_ABD);
        assert_ne!(abd, HEARTBEAT_ABC);
    }

    #[test]
    fn test_payload_changes_signature() {
        let secret = SecretKey::new("abc");
        let other = Signer::sign(&json!({ "isB7SConnected": false }), &secret).unwrap();
        assert_ne!(other, HEARTBEAT_ABC);
    }

    #[test]
    fn test_value_and_struct_agree() {
        let secret = SecretKey::new("abc");
        let from_value = Signer::sign(&json!({ "isB7SConnected": true }), &secret).unwrap();
        assert_eq!(from_value, HEARTBEAT_ABC);
    }

    #[test]
    fn test_signature_is_lowercase_hex() {
        let signature = Signer::sign_bytes(b"anything", &SecretKey::new("k")).unwrap();
        assert_eq!(signature.len(), SIGNATURE_SIZE * 2);
        assert!(signature.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_sealed_payload_matches_signature() {
        let secret = SecretKey::new("abc");
        let sealed = SignedPayload::seal(&HeartbeatPayload::CONNECTED, &secret).unwrap();
        assert_eq!(sealed.body, br#"{"isB7SConnected": true}"#);
        assert_eq!(sealed.signature, HEARTBEAT_ABC);
        assert_eq!(Signer::sign_bytes(&sealed.body, &secret).unwrap(), sealed.signature);
    }

    #[test]
    fn test_empty_secret_still_signs() {
        let signature = Signer::sign(&HeartbeatPayload::CONNECTED, &SecretKey::new("")).unwrap();
        assert_eq!(signature.len(), 128);
    }
}
