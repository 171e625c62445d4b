// ============================================
// File: crates/bless-transport/src/client.rs
// ============================================
//! # Gateway Client
//!
//! ## Creation Reason
//! The lifecycle code needs the five gateway calls with the retry policy
//! and heartbeat signing already applied. `GatewayClient` wraps a
//! [`Gateway`] to provide exactly that.
//!
//! ## Main Functionality
//! - `lookup_ip_address`: public address via the IP-check service
//! - `fetch_node_status`: reward figures
//! - `register_node`: registration with the discovered address
//! - `start_session`: session start
//! - `send_heartbeat`: signed ping
//!
//! ## Call Stack
//! ```text
//! NodeLifecycle ──► GatewayClient ──► RetryPolicy ──► dyn Gateway
//!                        │                              (1 attempt)
//!                        └──► Signer (heartbeat only)
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The heartbeat is signed once per call, all retries send the same bytes
//! - `Err` means the whole retry budget is spent; callers decide the
//!   fallback
//!
//! ## Last Modified
//! v0.1.0 - Initial gateway client

use std::fmt;
use std::sync::Arc;

use bless_common::{Node, NodeKey, Proxy, SecretKey};
use bless_core::error::CoreError;
use bless_core::{
    GatewayReply, HardwareInfo, HeartbeatPayload, NodeStatus, RegisterNodeRequest, SignedPayload,
};

use crate::error::{Result, TransportError};
use crate::retry::RetryPolicy;
use crate::traits::{Gateway, Operation};

// ============================================
// GatewayClient
// ============================================

/// Retrying, signing front end to a [`Gateway`].
#[derive(Clone)]
pub struct GatewayClient {
    gateway: Arc<dyn Gateway>,
    retry: RetryPolicy,
    hardware_info: HardwareInfo,
}

impl GatewayClient {
    /// Creates a client using the default hardware descriptor.
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>, retry: RetryPolicy) -> Self {
        Self {
            gateway,
            retry,
            hardware_info: HardwareInfo::default(),
        }
    }

    /// Replaces the hardware descriptor sent at registration.
    #[must_use]
    pub fn with_hardware_info(mut self, hardware_info: HardwareInfo) -> Self {
        self.hardware_info = hardware_info;
        self
    }

    /// Discovers the public address seen through `proxy`.
    ///
    /// # Errors
    /// Returns the policy error once every attempt failed. A blank `ip`
    /// counts as a failed attempt.
    pub async fn lookup_ip_address(&self, proxy: Option<&Proxy>) -> Result<String> {
        let gateway = self.gateway.as_ref();
        self.retry
            .run(Operation::IpLookup, move |_| async move {
                let echo = gateway.lookup_ip_address(proxy).await?;
                let ip = echo.ip.trim();
                if ip.is_empty() {
                    return Err(TransportError::reply(Operation::IpLookup, CoreError::EmptyBody));
                }
                Ok(ip.to_string())
            })
            .await
    }

    /// Fetches the node's status and reward figures.
    ///
    /// # Errors
    /// Returns the policy error once every attempt failed.
    pub async fn fetch_node_status(
        &self,
        token: &str,
        pub_key: &NodeKey,
        proxy: Option<&Proxy>,
    ) -> Result<NodeStatus> {
        let gateway = self.gateway.as_ref();
        self.retry
            .run(Operation::NodeStatus, move |_| {
                gateway.fetch_node_status(token, pub_key, proxy)
            })
            .await
    }

    /// Registers `node` from `ip_address`.
    ///
    /// # Errors
    /// Returns the policy error once every attempt failed.
    pub async fn register_node(
        &self,
        token: &str,
        node: &Node,
        ip_address: &str,
        proxy: Option<&Proxy>,
    ) -> Result<GatewayReply> {
        let gateway = self.gateway.as_ref();
        let request =
            RegisterNodeRequest::new(ip_address, node.hardware_id.as_str(), self.hardware_info.clone());
        let request = &request;
        let pub_key = &node.pub_key;
        self.retry
            .run(Operation::Register, move |_| {
                gateway.register_node(token, pub_key, request, proxy)
            })
            .await
    }

    /// Starts a session for the node.
    ///
    /// # Errors
    /// Returns the policy error once every attempt failed.
    pub async fn start_session(
        &self,
        token: &str,
        pub_key: &NodeKey,
        proxy: Option<&Proxy>,
    ) -> Result<GatewayReply> {
        let gateway = self.gateway.as_ref();
        self.retry
            .run(Operation::StartSession, move |_| {
                gateway.start_session(token, pub_key, proxy)
            })
            .await
    }

    /// Sends the signed heartbeat.
    ///
    /// # Errors
    /// - `Core` if the payload cannot be signed
    /// - The policy error once every attempt failed
    pub async fn send_heartbeat(
        &self,
        token: &str,
        secret: &SecretKey,
        pub_key: &NodeKey,
        proxy: Option<&Proxy>,
    ) -> Result<GatewayReply> {
        let payload = SignedPayload::seal(&HeartbeatPayload::CONNECTED, secret)?;
        let payload = &payload;
        let gateway = self.gateway.as_ref();
        self.retry
            .run(Operation::Heartbeat, move |_| {
                gateway.send_heartbeat(token, pub_key, payload, proxy)
            })
            .await
    }
}

impl fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockGateway, MockOutcome};
    use bless_core::Signer;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::Instant;

    fn client(mock: &Arc<MockGateway>, retry: RetryPolicy) -> GatewayClient {
        GatewayClient::new(mock.clone(), retry)
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_bound_per_call() {
        let mock = Arc::new(MockGateway::new());
        mock.set_default(Operation::StartSession, MockOutcome::fail("connection reset"));
        let started = Instant::now();

        let result = client(&mock, RetryPolicy::default())
            .start_session("tok", &NodeKey::new("pk"), None)
            .await;

        assert!(matches!(
            result,
            Err(TransportError::RetriesExhausted { attempts: 5, .. })
        ));
        assert_eq!(mock.count(Operation::StartSession), 5);
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_empty_body_is_failure() {
        let mock = Arc::new(MockGateway::new());
        mock.script(Operation::Register, [MockOutcome::Empty]);

        let node = Node::new("pk", "hw");
        let reply = client(&mock, RetryPolicy::immediate(2))
            .register_node("tok", &node, "1.2.3.4", None)
            .await
            .unwrap();

        // the first attempt got `{}` and was retried
        assert_eq!(mock.count(Operation::Register), 2);
        assert!(reply.is_object());
    }

    #[tokio::test]
    async fn test_blank_ip_is_failure() {
        let mock = Arc::new(MockGateway::new());
        mock.script(
            Operation::IpLookup,
            [MockOutcome::ok(json!({ "ip": " " })), MockOutcome::ok(json!({ "ip": "1.2.3.4" }))],
        );

        let ip = client(&mock, RetryPolicy::immediate(5))
            .lookup_ip_address(None)
            .await
            .unwrap();

        assert_eq!(ip, "1.2.3.4");
        assert_eq!(mock.count(Operation::IpLookup), 2);
    }

    #[tokio::test]
    async fn test_register_body() {
        let mock = Arc::new(MockGateway::new());
        let node = Node::new("pk", "hw-1");

        client(&mock, RetryPolicy::single())
            .register_node("tok", &node, "1.2.3.4", None)
            .await
            .unwrap();

        let requests = mock.register_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].ip_address, "1.2.3.4");
        assert_eq!(requests[0].hardware_id, "hw-1");
    }

    #[tokio::test]
    async fn test_heartbeat_signed_once_for_all_retries() {
        let mock = Arc::new(MockGateway::new());
        mock.script(
            Operation::Heartbeat,
            [MockOutcome::status(500), MockOutcome::status(502)],
        );
        let secret = SecretKey::new("abc");

        client(&mock, RetryPolicy::immediate(5))
            .send_heartbeat("tok", &secret, &NodeKey::new("pk"), None)
            .await
            .unwrap();

        let sent = mock.heartbeats();
        assert_eq!(sent.len(), 3);
        let expected = Signer::sign(&HeartbeatPayload::CONNECTED, &secret).unwrap();
        for payload in sent {
            assert_eq!(payload.body, br#"{"isB7SConnected": true}"#);
            assert_eq!(payload.signature, expected);
        }
    }

    #[tokio::test]
    async fn test_proxy_passed_through() {
        let mock = Arc::new(MockGateway::new());
        let proxy: Proxy = "10.0.0.1:8080".parse().unwrap();

        client(&mock, RetryPolicy::single())
            .fetch_node_status("tok", &NodeKey::new("pk"), Some(&proxy))
            .await
            .unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].proxy.as_ref(), Some(&proxy));
        assert_eq!(calls[0].pub_key.as_ref().map(NodeKey::as_str), Some("pk"));
    }
}
