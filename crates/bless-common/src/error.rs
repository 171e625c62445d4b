// ============================================
// File: crates/bless-common/src/error.rs
// ============================================
//! # Common Error Types
//!
//! ## Creation Reason
//! Provides the foundational error type used when validating accounts,
//! nodes and proxy entries, shared by every crate in the workspace.
//!
//! ## Design Philosophy
//! - Use `thiserror` for ergonomic error definitions
//! - Each crate defines its own error type that wraps `CommonError`
//! - Error messages name the offending field, never its value
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

// ============================================
// Result Type Alias
// ============================================

/// Common result type for operations that may fail.
pub type Result<T> = std::result::Result<T, CommonError>;

// ============================================
// CommonError
// ============================================

/// Common error types shared across Bless crates.
///
/// # Example
/// ```
/// use bless_common::error::{CommonError, Result};
///
/// fn require_token(token: &str) -> Result<()> {
///     if token.is_empty() {
///         return Err(CommonError::invalid_input("Token", "cannot be empty"));
///     }
///     Ok(())
/// }
///
/// assert!(require_token("").is_err());
/// ```
#[derive(Error, Debug)]
pub enum CommonError {
    /// Invalid input data provided.
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput {
        /// Name of the field or parameter
        field: String,
        /// Description of what's wrong
        reason: String,
    },

    /// A value could not be parsed.
    #[error("Failed to parse {what}: {details}")]
    Parse {
        /// What was being parsed
        what: String,
        /// Error details
        details: String,
    },

    /// System I/O error occurred.
    #[error("I/O error: {context}")]
    Io {
        /// What operation was being performed
        context: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

impl CommonError {
    /// Creates an `InvalidInput` error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `Parse` error.
    pub fn parse(what: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            details: details.into(),
        }
    }
}

impl From<std::io::Error> for CommonError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            context: "unspecified I/O operation".into(),
            source: err,
        }
    }
}

// ============================================
// Tests
// ============================================
