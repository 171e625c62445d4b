// ============================================
// File: crates/bless-node/src/error.rs
// ============================================
//! # Node Client Error Types
//!
//! ## Creation Reason
//! Wraps lower-crate errors and adds the startup failures of the binary:
//! configuration, account file and proxy list.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Startup errors (`is_fatal`) end the process with a non-zero code
//! - Runtime gateway errors never reach this type; the lifecycle turns
//!   them into events and retries
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

use bless_common::error::CommonError;
use bless_core::error::CoreError;
use bless_transport::error::TransportError;

/// Result type for node client operations.
pub type Result<T> = std::result::Result<T, NodeError>;

/// Node client error types.
#[derive(Error, Debug)]
pub enum NodeError {
    /// Configuration file could not be read or parsed.
    #[error("Failed to load configuration from '{path}': {reason}")]
    ConfigLoad {
        /// File path
        path: String,
        /// Why loading failed
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {field} - {reason}")]
    ConfigInvalid {
        /// Dotted field name
        field: String,
        /// What is wrong
        reason: String,
    },

    /// Account file could not be read or parsed.
    #[error("Failed to load accounts from '{path}': {reason}")]
    AccountLoad {
        /// File path
        path: String,
        /// Why loading failed
        reason: String,
    },

    /// Proxy list could not be read or downloaded.
    #[error("Failed to load proxies from '{source_name}': {reason}")]
    ProxyLoad {
        /// File path or URL
        source_name: String,
        /// Why loading failed
        reason: String,
    },

    /// Proxy mode requires proxies but the list is empty.
    #[error("No usable proxies in '{source_name}'")]
    NoProxies {
        /// File path or URL
        source_name: String,
    },

    /// Error from common crate.
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Error from core crate.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Error from transport crate.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NodeError {
    /// Creates a `ConfigLoad` error.
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `ConfigInvalid` error.
    pub fn config_invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `AccountLoad` error.
    pub fn account_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AccountLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `ProxyLoad` error.
    pub fn proxy_load(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProxyLoad {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for configuration errors.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigLoad { .. } | Self::ConfigInvalid { .. })
    }

    /// Returns `true` if the process cannot start.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoad { .. }
                | Self::ConfigInvalid { .. }
                | Self::AccountLoad { .. }
                | Self::ProxyLoad { .. }
                | Self::NoProxies { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NodeError::account_load("accounts.json", "file not found");
        assert!(err.to_string().contains("accounts.json"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_classification() {
        let config_err = NodeError::config_invalid("retry.max_attempts", "must be > 0");
        assert!(config_err.is_config_error());
        assert!(config_err.is_fatal());

        let proxy_err = NodeError::NoProxies {
            source_name: "proxy.txt".into(),
        };
        assert!(!proxy_err.is_config_error());
        assert!(proxy_err.is_fatal());

        let transport = NodeError::from(TransportError::client("tls"));
        assert!(!transport.is_fatal());
    }
}
