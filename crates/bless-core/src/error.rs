// ============================================
// File: crates/bless-core/src/error.rs
// ============================================
//! # Core Error Types
//!
//! ## Creation Reason
//! Defines error types for the gateway protocol codec and heartbeat signing.
//!
//! ## Error Categories
//! 1. **Codec Errors**: encoding requests, decoding gateway replies
//! 2. **Crypto Errors**: MAC initialisation
//!
//! ## ⚠️ Important Note for Next Developer
//! - NEVER include the secret key or bearer token in error messages
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

// ============================================
// Result Type Alias
// ============================================

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

// ============================================
// CoreError
// ============================================

/// Core error types for protocol and cryptographic operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Failed to encode a payload.
    #[error("Encoding error: {context}: {details}")]
    Encoding {
        /// What was being encoded
        context: String,
        /// Error details
        details: String,
    },

    /// Failed to decode a gateway reply.
    #[error("Decoding error: {context}: {details}")]
    Decoding {
        /// What was being decoded
        context: String,
        /// Error details
        details: String,
    },

    /// Gateway replied with `null`, `{}` or `[]`.
    #[error("Empty response body")]
    EmptyBody,

    /// The MAC could not be keyed.
    #[error("Invalid signing key: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },
}

impl CoreError {
    /// Creates an `Encoding` error.
    pub fn encoding(context: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Encoding {
            context: context.into(),
            details: details.into(),
        }
    }

    /// Creates a `Decoding` error.
    pub fn decoding(context: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Decoding {
            context: context.into(),
            details: details.into(),
        }
    }

    /// Returns `true` if the error came from a gateway reply rather than
    /// from local input.
    #[must_use]
    pub const fn is_reply_error(&self) -> bool {
        matches!(self, Self::Decoding { .. } | Self::EmptyBody)
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::decoding("node status", "expected object");
        assert!(err.to_string().contains("node status"));
        assert!(err.to_string().contains("expected object"));
    }

    #[test]
    fn test_error_classification() {
        assert!(CoreError::EmptyBody.is_reply_error());
        assert!(CoreError::decoding("ip", "missing field").is_reply_error());
        assert!(!CoreError::encoding("payload", "bad").is_reply_error());
    }
}
