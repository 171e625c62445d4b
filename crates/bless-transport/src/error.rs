// ============================================
// File: crates/bless-transport/src/error.rs
// ============================================
//! # Transport Error Types
//!
//! ## Creation Reason
//! Defines error types for gateway calls, covering the HTTP request
//! itself, the reply it produced and the retry policy wrapped around it.
//!
//! ## Main Functionality
//! - `TransportError`: Primary error enum for gateway operations
//! - Categorization of retryable vs local errors
//!
//! ## Error Categories
//! 1. **Request Errors**: connection failures, timeouts
//! 2. **Reply Errors**: non-2xx status, malformed or empty body
//! 3. **Local Errors**: proxy URL rejected, client build, encoding
//! 4. **Policy Errors**: every attempt failed
//!
//! ## ⚠️ Important Note for Next Developer
//! - Request and reply errors are retried by `RetryPolicy`
//! - Local errors are returned immediately, retrying cannot fix them
//! - Never put a bearer token or proxy password in an error message
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

use bless_core::error::CoreError;

use crate::traits::Operation;

// ============================================
// Result Type Alias
// ============================================

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Maximum number of reply body characters kept in a `Status` error.
const STATUS_BODY_LIMIT: usize = 200;

// ============================================
// TransportError
// ============================================

/// Transport layer error types.
#[derive(Error, Debug)]
pub enum TransportError {
    // ========================================
    // Request Errors
    // ========================================

    /// The request could not be completed.
    #[error("{operation} request failed: {reason}")]
    Request {
        /// Gateway operation
        operation: Operation,
        /// Why the request failed
        reason: String,
    },

    /// The request did not finish within the client timeout.
    #[error("{operation} request timed out")]
    Timeout {
        /// Gateway operation
        operation: Operation,
    },

    // ========================================
    // Reply Errors
    // ========================================

    /// The gateway answered with a non-success status.
    #[error("{operation} returned HTTP {status}: {body}")]
    Status {
        /// Gateway operation
        operation: Operation,
        /// HTTP status code
        status: u16,
        /// Start of the reply body
        body: String,
    },

    /// The reply body was empty or did not decode.
    #[error("{operation} reply rejected: {source}")]
    Reply {
        /// Gateway operation
        operation: Operation,
        /// Decoding failure
        #[source]
        source: CoreError,
    },

    // ========================================
    // Local Errors
    // ========================================

    /// A proxy entry was rejected by the HTTP client.
    #[error("Invalid proxy {proxy}: {reason}")]
    Proxy {
        /// Redacted proxy URL
        proxy: String,
        /// Why it was rejected
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {reason}")]
    Client {
        /// Why the client could not be built
        reason: String,
    },

    /// Payload encoding or signing failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    // ========================================
    // Policy Errors
    // ========================================

    /// Every attempt allowed by the retry policy failed.
    #[error("{operation} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Gateway operation
        operation: Operation,
        /// Number of attempts made
        attempts: u32,
        /// Error of the final attempt
        #[source]
        last: Box<TransportError>,
    },
}

impl TransportError {
    // ========================================
    // Convenience Constructors
    // ========================================

    /// Creates a `Request` error.
    pub fn request(operation: Operation, reason: impl Into<String>) -> Self {
        Self::Request {
            operation,
            reason: reason.into(),
        }
    }

    /// Creates a `Status` error, truncating the body.
    pub fn status(operation: Operation, status: u16, body: &str) -> Self {
        Self::Status {
            operation,
            status,
            body: body.chars().take(STATUS_BODY_LIMIT).collect(),
        }
    }

    /// Creates a `Reply` error.
    #[must_use]
    pub const fn reply(operation: Operation, source: CoreError) -> Self {
        Self::Reply { operation, source }
    }

    /// Creates a `Client` error.
    pub fn client(reason: impl Into<String>) -> Self {
        Self::Client {
            reason: reason.into(),
        }
    }

    /// Maps a `reqwest` error onto `Timeout` or `Request`.
    #[must_use]
    pub fn from_reqwest(operation: Operation, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { operation }
        } else {
            Self::request(operation, err.to_string())
        }
    }

    // ========================================
    // Error Classification
    // ========================================

    /// Returns `true` if another attempt may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Request { .. } | Self::Timeout { .. } | Self::Status { .. } | Self::Reply { .. }
        )
    }

    /// Returns `true` if the gateway answered but the answer was unusable.
    #[must_use]
    pub const fn is_reply_error(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Reply { .. })
    }

    /// Returns the operation the error belongs to, if known.
    #[must_use]
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::Request { operation, .. }
            | Self::Timeout { operation }
            | Self::Status { operation, .. }
            | Self::Reply { operation, .. }
            | Self::RetriesExhausted { operation, .. } => Some(*operation),
            Self::Proxy { .. } | Self::Client { .. } | Self::Core(_) => None,
        }
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
        let err = TransportError::status(Operation::Register, 502, "bad gateway");
        assert!(err.to_string().contains("register"));
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn test_status_body_truncated() {
        let long = "x".repeat(1000);
        match TransportError::status(Operation::Heartbeat, 500, &long) {
            TransportError::Status { body, .. } => assert_eq!(body.len(), STATUS_BODY_LIMIT),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_classification() {
        assert!(TransportError::request(Operation::IpLookup, "refused").is_retryable());
        assert!(TransportError::Timeout { operation: Operation::NodeStatus }.is_retryable());
        assert!(TransportError::reply(Operation::StartSession, CoreError::EmptyBody).is_retryable());
        assert!(TransportError::status(Operation::Register, 401, "").is_reply_error());

        assert!(!TransportError::client("no tls backend").is_retryable());
        assert!(!TransportError::from(CoreError::encoding("heartbeat", "bad")).is_retryable());
    }

    #[test]
    fn test_exhausted_keeps_last_error() {
        let err = TransportError::RetriesExhausted {
            operation: Operation::Heartbeat,
            attempts: 5,
            last: Box::new(TransportError::request(Operation::Heartbeat, "reset")),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.operation(), Some(Operation::Heartbeat));
        assert!(err.to_string().contains("5 attempts"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
