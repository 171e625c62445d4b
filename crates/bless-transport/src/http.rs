// ============================================
// File: crates/bless-transport/src/http.rs
// ============================================
//! # HTTP Gateway
//!
//! ## Creation Reason
//! `reqwest` implementation of [`Gateway`], talking to the IP-check
//! service and the node gateway the way the browser extension does.
//!
//! ## Main Functionality
//! - Browser-extension headers (and a JSON content type) on every request
//! - Bearer auth and per-route `X-Extension-Version`
//! - One `reqwest::Client` per proxy, built lazily and cached
//! - Status and body checks mapped onto `TransportError`
//!
//! ## Request Shape
//! ```text
//! POST {base}/api/v1/nodes/{pubKey}/ping
//!   Authorization: Bearer <token>
//!   X-Extension-Version: 0.1.8
//!   X-Extension-Signature: <hex hmac>
//!   Content-Type: application/json
//!   {"isB7SConnected": true}
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The heartbeat body is sent from `SignedPayload::body`, never
//!   re-serialized
//! - Every other body goes through the canonical codec as well, so all
//!   requests share the extension's `", "` / `": "` layout
//! - `reqwest` proxies are fixed at client build time, hence the cache
//!
//! ## Last Modified
//! v0.1.0 - Initial HTTP gateway

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, ORIGIN,
    USER_AGENT,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use bless_common::{NodeKey, Proxy};
use bless_core::protocol::{
    decode_reply, to_canonical_vec, NodeRoute, EXTENSION_ORIGIN, EXTENSION_USER_AGENT,
    GATEWAY_BASE_URL, IP_CHECK_URL,
};
use bless_core::{
    GatewayReply, IpEcho, NodeStatus, RegisterNodeRequest, SignedPayload, StartSessionRequest,
};

use crate::error::{Result, TransportError};
use crate::traits::{Gateway, Operation};

const EXTENSION_VERSION_HEADER: &str = "X-Extension-Version";
const EXTENSION_SIGNATURE_HEADER: &str = "X-Extension-Signature";
const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================
// GatewaySettings
// ============================================

/// Endpoints and client identity used by [`HttpGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Node gateway base URL.
    pub base_url: String,
    /// IP-check service URL.
    pub ip_check_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header.
    pub user_agent: String,
    /// `Origin` header.
    pub origin: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: GATEWAY_BASE_URL.to_string(),
            ip_check_url: IP_CHECK_URL.to_string(),
            timeout: Duration::from_secs(60),
            user_agent: EXTENSION_USER_AGENT.to_string(),
            origin: EXTENSION_ORIGIN.to_string(),
        }
    }
}

// ============================================
// HttpGateway
// ============================================

/// `reqwest`-backed gateway.
pub struct HttpGateway {
    settings: GatewaySettings,
    /// Client for direct connections.
    direct: Client,
    /// Clients keyed by full proxy URL.
    proxied: DashMap<String, Client>,
}

impl HttpGateway {
    /// Creates a gateway with the given settings.
    ///
    /// # Errors
    /// Returns `Client` if a header value is invalid or the TLS backend
    /// cannot be initialised.
    pub fn new(settings: GatewaySettings) -> Result<Self> {
        let direct = Self::build_client(&settings, None)?;
        Ok(Self {
            settings,
            direct,
            proxied: DashMap::new(),
        })
    }

    /// Returns the settings in use.
    #[must_use]
    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    fn default_headers(settings: &GatewaySettings) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent)
                .map_err(|e| TransportError::client(format!("user agent: {e}")))?,
        );
        headers.insert(
            ORIGIN,
            HeaderValue::from_str(&settings.origin)
                .map_err(|e| TransportError::client(format!("origin: {e}")))?,
        );
        Ok(headers)
    }

    fn build_client(settings: &GatewaySettings, proxy: Option<&Proxy>) -> Result<Client> {
        let mut builder = Client::builder()
            .default_headers(Self::default_headers(settings)?)
            .timeout(settings.timeout);
        if let Some(proxy) = proxy {
            let rp = reqwest::Proxy::all(proxy.url()).map_err(|e| TransportError::Proxy {
                proxy: proxy.redacted(),
                reason: e.to_string(),
            })?;
            builder = builder.proxy(rp);
        }
        builder
            .build()
            .map_err(|e| TransportError::client(e.to_string()))
    }

    /// Returns the client for `proxy`, building it on first use.
    fn client_for(&self, proxy: Option<&Proxy>) -> Result<Client> {
        let Some(proxy) = proxy else {
            return Ok(self.direct.clone());
        };
        if let Some(client) = self.proxied.get(proxy.url()) {
            return Ok(client.clone());
        }
        let client = Self::build_client(&self.settings, Some(proxy))?;
        debug!(proxy = %proxy, "Built proxied HTTP client");
        Ok(self
            .proxied
            .entry(proxy.url().to_string())
            .or_insert(client)
            .clone())
    }

    /// Number of cached proxied clients.
    #[must_use]
    pub fn cached_clients(&self) -> usize {
        self.proxied.len()
    }

    fn node_request(
        &self,
        client: &Client,
        route: NodeRoute,
        post: bool,
        token: &str,
        pub_key: &NodeKey,
    ) -> RequestBuilder {
        let url = route.url(&self.settings.base_url, pub_key);
        let request = if post { client.post(url) } else { client.get(url) };
        request
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(EXTENSION_VERSION_HEADER, route.extension_version())
    }

    async fn execute<T>(operation: Operation, request: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(operation, &e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(operation, &e))?;
        trace!(%operation, status = status.as_u16(), len = body.len(), "Gateway reply");

        if !status.is_success() {
            return Err(TransportError::status(
                operation,
                status.as_u16(),
                &String::from_utf8_lossy(&body),
            ));
        }
        decode_reply(operation.as_str(), &body).map_err(|e| TransportError::reply(operation, e))
    }
}

impl fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.settings.base_url)
            .field("ip_check_url", &self.settings.ip_check_url)
            .field("cached_clients", &self.proxied.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn lookup_ip_address(&self, proxy: Option<&Proxy>) -> Result<IpEcho> {
        let client = self.client_for(proxy)?;
        Self::execute(Operation::IpLookup, client.get(&self.settings.ip_check_url)).await
    }

    async fn fetch_node_status(
        &self,
        token: &str,
        pub_key: &NodeKey,
        proxy: Option<&Proxy>,
    ) -> Result<NodeStatus> {
        let client = self.client_for(proxy)?;
        let request = self.node_request(&client, NodeRoute::Node, false, token, pub_key);
        Self::execute(Operation::NodeStatus, request).await
    }

    async fn register_node(
        &self,
        token: &str,
        pub_key: &NodeKey,
        request: &RegisterNodeRequest,
        proxy: Option<&Proxy>,
    ) -> Result<GatewayReply> {
        let client = self.client_for(proxy)?;
        let body = to_canonical_vec(request)?;
        let builder = self
            .node_request(&client, NodeRoute::Node, true, token, pub_key)
            .body(body);
        Self::execute(Operation::Register, builder).await
    }

    async fn start_session(
        &self,
        token: &str,
        pub_key: &NodeKey,
        proxy: Option<&Proxy>,
    ) -> Result<GatewayReply> {
        let client = self.client_for(proxy)?;
        let body = to_canonical_vec(&StartSessionRequest {})?;
        let builder = self
            .node_request(&client, NodeRoute::StartSession, true, token, pub_key)
            .body(body);
        Self::execute(Operation::StartSession, builder).await
    }

    async fn send_heartbeat(
        &self,
        token: &str,
        pub_key: &NodeKey,
        payload: &SignedPayload,
        proxy: Option<&Proxy>,
    ) -> Result<GatewayReply> {
        let client = self.client_for(proxy)?;
        let builder = self
            .node_request(&client, NodeRoute::Ping, true, token, pub_key)
            .header(EXTENSION_SIGNATURE_HEADER, payload.signature.as_str())
            .body(payload.body.clone());
        Self::execute(Operation::Heartbeat, builder).await
    }
}

// ============================================
// Tests
// ============================================
