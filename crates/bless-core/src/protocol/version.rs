// ============================================
// File: crates/bless-core/src/protocol/version.rs
// ============================================
//! # Extension Versions & Endpoints
//!
//! ## Creation Reason
//! The gateway identifies callers as the browser extension. The version
//! strings, header values and paths it expects live here, in one place.
//!
//! ## Version History
//! | Value   | Used by |
//! |---------|---------|
//! | `0.1.7` | status, register (also sent in the body), start-session |
//! | `0.1.8` | ping |
//!
//! ## Last Modified
//! v0.1.0 - Initial version definitions

use std::fmt;

use bless_common::NodeKey;

// ============================================
// Constants
// ============================================

/// Extension version sent with status, registration and session calls.
pub const EXTENSION_VERSION: &str = "0.1.7";

/// Extension version sent with heartbeats.
pub const PING_EXTENSION_VERSION: &str = "0.1.8";

/// Default gateway base URL.
pub const GATEWAY_BASE_URL: &str = "https://gateway-run.bls.dev";

/// Default IP-echo URL.
pub const IP_CHECK_URL: &str = "https://ip-check.bless.network/";

/// `Origin` header of the browser extension.
pub const EXTENSION_ORIGIN: &str = "chrome-extension://pljbjcehnhcnofmkdbjolghdcjnmekia";

/// `User-Agent` header of the browser extension.
pub const EXTENSION_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/130.0.0.0 Mobile Safari/537.36";

// ============================================
// NodeRoute
// ============================================

/// Per-node gateway endpoints.
///
/// # Example
/// ```
/// use bless_common::NodeKey;
/// use bless_core::protocol::NodeRoute;
///
/// let key = NodeKey::new("12D3KooWabc");
/// assert_eq!(NodeRoute::Ping.path(&key), "/api/v1/nodes/12D3KooWabc/ping");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRoute {
    /// `GET` status or `POST` registration.
    Node,
    /// `POST` session start.
    StartSession,
    /// `POST` signed heartbeat.
    Ping,
}

impl NodeRoute {
    /// Returns the path for a node, relative to the gateway base URL.
    #[must_use]
    pub fn path(self, pub_key: &NodeKey) -> String {
        match self {
            Self::Node => format!("/api/v1/nodes/{pub_key}"),
            Self::StartSession => format!("/api/v1/nodes/{pub_key}/start-session"),
            Self::Ping => format!("/api/v1/nodes/{pub_key}/ping"),
        }
    }

    /// Returns the absolute URL for a node under `base_url`.
    #[must_use]
    pub fn url(self, base_url: &str, pub_key: &NodeKey) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path(pub_key))
    }

    /// Returns the extension version the gateway expects on this route.
    #[must_use]
    pub const fn extension_version(self) -> &'static str {
        match self {
            Self::Node | Self::StartSession => EXTENSION_VERSION,
            Self::Ping => PING_EXTENSION_VERSION,
        }
    }
}

impl fmt::Display for NodeRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => f.write_str("node"),
            Self::StartSession => f.write_str("start-session"),
            Self::Ping => f.write_str("ping"),
        }
    }
}

// ============================================
// Tests
// ============================================
