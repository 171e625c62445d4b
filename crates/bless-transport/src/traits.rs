// ============================================
// File: crates/bless-transport/src/traits.rs
// ============================================
//! # Transport Traits
//!
//! ## Creation Reason
//! Defines the abstract gateway interface so the lifecycle code can run
//! against the real HTTP gateway or an in-memory mock.
//!
//! ## Main Functionality
//! - `Operation`: names the five gateway calls (logs, errors, mock script)
//! - `Gateway`: one method per call, exactly one HTTP attempt each
//!
//! ## Design Philosophy
//! - Traits enable mock implementations for testing
//! - Async-first design with `async_trait`
//! - Retries live above this trait, in `GatewayClient`
//!
//! ## ⚠️ Important Note for Next Developer
//! - Implementations must be Send + Sync, one instance is shared by every
//!   node task
//! - The proxy is passed in on every call and must be used as given
//!
//! ## Last Modified
//! v0.1.0 - Initial trait definitions

use std::fmt;

use async_trait::async_trait;

use bless_common::{NodeKey, Proxy};
use bless_core::{GatewayReply, IpEcho, NodeStatus, RegisterNodeRequest, SignedPayload};

use crate::error::Result;

// ============================================
// Operation
// ============================================

/// The gateway calls made by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// Public IP discovery.
    IpLookup,
    /// Reward status fetch.
    NodeStatus,
    /// Node registration.
    Register,
    /// Session start.
    StartSession,
    /// Signed ping.
    Heartbeat,
}

impl Operation {
    /// All operations, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::IpLookup,
        Self::Register,
        Self::StartSession,
        Self::Heartbeat,
        Self::NodeStatus,
    ];

    /// Short lowercase name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IpLookup => "ip lookup",
            Self::NodeStatus => "node status",
            Self::Register => "register",
            Self::StartSession => "start session",
            Self::Heartbeat => "heartbeat",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================
// Gateway Trait
// ============================================

/// Abstract interface to the node gateway.
///
/// Every method performs a single attempt. `proxy = None` means a direct
/// connection.
///
/// # Example
/// ```ignore
/// async fn current_ip(gateway: &dyn Gateway) -> Result<String> {
///     Ok(gateway.lookup_ip_address(None).await?.ip)
/// }
/// ```
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Asks the IP-check service for the caller's public address.
    ///
    /// # Errors
    /// Returns error on request failure, non-2xx status or bad body.
    async fn lookup_ip_address(&self, proxy: Option<&Proxy>) -> Result<IpEcho>;

    /// Fetches the node's status and reward figures.
    ///
    /// # Errors
    /// Returns error on request failure, non-2xx status or bad body.
    async fn fetch_node_status(
        &self,
        token: &str,
        pub_key: &NodeKey,
        proxy: Option<&Proxy>,
    ) -> Result<NodeStatus>;

    /// Registers the node from the given address.
    ///
    /// # Errors
    /// Returns error on request failure, non-2xx status or empty body.
    async fn register_node(
        &self,
        token: &str,
        pub_key: &NodeKey,
        request: &RegisterNodeRequest,
        proxy: Option<&Proxy>,
    ) -> Result<GatewayReply>;

    /// Starts a session for the node.
    ///
    /// # Errors
    /// Returns error on request failure, non-2xx status or empty body.
    async fn start_session(
        &self,
        token: &str,
        pub_key: &NodeKey,
        proxy: Option<&Proxy>,
    ) -> Result<GatewayReply>;

    /// Sends a signed ping. `payload.body` is sent byte for byte.
    ///
    /// # Errors
    /// Returns error on request failure, non-2xx status or empty body.
    async fn send_heartbeat(
        &self,
        token: &str,
        pub_key: &NodeKey,
        payload: &SignedPayload,
        proxy: Option<&Proxy>,
    ) -> Result<GatewayReply>;
}

// ============================================
// Tests
// ============================================
