// ============================================
// File: crates/bless-transport/src/mock.rs
// ============================================
//! # Mock Gateway Implementation
//!
//! ## Creation Reason
//! Provides an in-memory gateway so lifecycle, loop and scheduler tests run
//! without network access and with full control over each reply.
//!
//! ## Main Functionality
//! - Scripted outcomes per operation, optionally per node
//! - Default outcome once a script runs dry
//! - Call log with proxy, node and (tokio) timestamp
//! - Captured heartbeat payloads and registration bodies
//!
//! ## Usage in Tests
//! ```ignore
//! use std::sync::Arc;
//! use bless_transport::mock::{MockGateway, MockOutcome};
//! use bless_transport::{GatewayClient, Operation, RetryPolicy};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mock = Arc::new(MockGateway::new());
//! mock.script(Operation::IpLookup, [MockOutcome::fail("refused")]);
//!
//! let client = GatewayClient::new(mock.clone(), RetryPolicy::immediate(2));
//! let ip = client.lookup_ip_address(None).await.unwrap();
//!
//! assert_eq!(ip, "127.0.0.1");
//! assert_eq!(mock.count(Operation::IpLookup), 2);
//! # }
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - This is for testing only, enabled by `cfg(test)` or the `mock` feature
//! - Node-specific scripts win over operation-wide scripts
//! - IP lookups carry no node key, script them operation-wide
//!
//! ## Last Modified
//! v0.1.0 - Initial mock implementation

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::Notify;
use tokio::time::Instant;

use bless_common::{NodeKey, Proxy};
use bless_core::error::CoreError;
use bless_core::protocol::decode_reply;
use bless_core::{GatewayReply, IpEcho, NodeStatus, RegisterNodeRequest, SignedPayload};

use crate::error::{Result, TransportError};
use crate::traits::{Gateway, Operation};

// ============================================
// MockOutcome
// ============================================

/// Result of one mocked call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    /// 2xx with this JSON body.
    Ok(Value),
    /// Request-level failure.
    Fail(String),
    /// Non-2xx status.
    Status(u16),
    /// Client timeout.
    Timeout,
    /// 2xx with `{}`.
    Empty,
}

impl MockOutcome {
    /// Creates an `Ok` outcome.
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::Ok(body)
    }

    /// Creates a `Fail` outcome.
    pub fn fail(reason: impl Into<String>) -> Self {
        Self::Fail(reason.into())
    }

    /// Creates a `Status` outcome.
    #[must_use]
    pub const fn status(code: u16) -> Self {
        Self::Status(code)
    }

    fn builtin(operation: Operation) -> Self {
        match operation {
            Operation::IpLookup => Self::Ok(json!({ "ip": "127.0.0.1" })),
            Operation::NodeStatus => Self::Ok(json!({ "todayReward": 1.5, "totalReward": 42 })),
            Operation::Register | Operation::StartSession | Operation::Heartbeat => {
                Self::Ok(json!({ "status": "ok" }))
            }
        }
    }

    fn resolve<T>(self, operation: Operation) -> Result<T>
    where
        T: DeserializeOwned,
    {
        match self {
            Self::Ok(body) => {
                let bytes = serde_json::to_vec(&body)
                    .map_err(|e| CoreError::encoding("mock reply", e.to_string()))?;
                decode_reply(operation.as_str(), &bytes)
                    .map_err(|e| TransportError::reply(operation, e))
            }
            Self::Empty => Err(TransportError::reply(operation, CoreError::EmptyBody)),
            Self::Fail(reason) => Err(TransportError::request(operation, reason)),
            Self::Status(code) => Err(TransportError::status(operation, code, "mock")),
            Self::Timeout => Err(TransportError::Timeout { operation }),
        }
    }
}

// ============================================
// MockCall
// ============================================

/// One recorded call.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// Which call was made.
    pub operation: Operation,
    /// Node the call was for, `None` for IP lookups.
    pub pub_key: Option<NodeKey>,
    /// Proxy the call was routed through.
    pub proxy: Option<Proxy>,
    /// When the call was made.
    pub at: Instant,
}

// ============================================
// MockGateway
// ============================================

type ScriptKey = (Operation, Option<NodeKey>);

#[derive(Default)]
struct MockState {
    scripts: HashMap<ScriptKey, VecDeque<MockOutcome>>,
    defaults: HashMap<ScriptKey, MockOutcome>,
    calls: Vec<MockCall>,
    heartbeats: Vec<SignedPayload>,
    registrations: Vec<RegisterNodeRequest>,
}

impl MockState {
    fn next_outcome(&mut self, operation: Operation, pub_key: Option<&NodeKey>) -> MockOutcome {
        let node_key = pub_key.map(|key| (operation, Some(key.clone())));
        let any_key = (operation, None);

        if let Some(key) = &node_key {
            if let Some(outcome) = self.scripts.get_mut(key).and_then(VecDeque::pop_front) {
                return outcome;
            }
        }
        if let Some(outcome) = self.scripts.get_mut(&any_key).and_then(VecDeque::pop_front) {
            return outcome;
        }
        node_key
            .and_then(|key| self.defaults.get(&key).cloned())
            .or_else(|| self.defaults.get(&any_key).cloned())
            .unwrap_or_else(|| MockOutcome::builtin(operation))
    }
}

/// In-memory [`Gateway`] for tests.
#[derive(Default)]
pub struct MockGateway {
    state: Mutex<MockState>,
    call_notify: Notify,
}

impl MockGateway {
    /// Creates a mock answering every call successfully.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues outcomes for `operation` on any node.
    pub fn script(&self, operation: Operation, outcomes: impl IntoIterator<Item = MockOutcome>) {
        self.state
            .lock()
            .scripts
            .entry((operation, None))
            .or_default()
            .extend(outcomes);
    }

    /// Queues outcomes for `operation` on one node.
    pub fn script_node(
        &self,
        operation: Operation,
        pub_key: &NodeKey,
        outcomes: impl IntoIterator<Item = MockOutcome>,
    ) {
        self.state
            .lock()
            .scripts
            .entry((operation, Some(pub_key.clone())))
            .or_default()
            .extend(outcomes);
    }

    /// Sets the outcome used once the script for `operation` is empty.
    pub fn set_default(&self, operation: Operation, outcome: MockOutcome) {
        self.state.lock().defaults.insert((operation, None), outcome);
    }

    /// Sets the fallback outcome of `operation` for one node.
    pub fn set_node_default(&self, operation: Operation, pub_key: &NodeKey, outcome: MockOutcome) {
        self.state
            .lock()
            .defaults
            .insert((operation, Some(pub_key.clone())), outcome);
    }

    /// Returns every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    /// Returns the sequence of operations called so far.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        self.state.lock().calls.iter().map(|c| c.operation).collect()
    }

    /// Number of calls of `operation`.
    #[must_use]
    pub fn count(&self, operation: Operation) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Number of calls of `operation` for one node.
    #[must_use]
    pub fn count_for(&self, operation: Operation, pub_key: &NodeKey) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation && c.pub_key.as_ref() == Some(pub_key))
            .count()
    }

    /// Heartbeat payloads received, in order.
    #[must_use]
    pub fn heartbeats(&self) -> Vec<SignedPayload> {
        self.state.lock().heartbeats.clone()
    }

    /// Registration bodies received, in order.
    #[must_use]
    pub fn register_requests(&self) -> Vec<RegisterNodeRequest> {
        self.state.lock().registrations.clone()
    }

    /// Waits until `operation` has been called at least `count` times.
    pub async fn wait_for(&self, operation: Operation, count: usize) {
        loop {
            let notified = self.call_notify.notified();
            if self.count(operation) >= count {
                return;
            }
            notified.await;
        }
    }

    fn record(&self, operation: Operation, pub_key: Option<&NodeKey>, proxy: Option<&Proxy>) -> MockOutcome {
        let outcome = {
            let mut state = self.state.lock();
            state.calls.push(MockCall {
                operation,
                pub_key: pub_key.cloned(),
                proxy: proxy.cloned(),
                at: Instant::now(),
            });
            state.next_outcome(operation, pub_key)
        };
        self.call_notify.notify_waiters();
        outcome
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn lookup_ip_address(&self, proxy: Option<&Proxy>) -> Result<IpEcho> {
        self.record(Operation::IpLookup, None, proxy)
            .resolve(Operation::IpLookup)
    }

    async fn fetch_node_status(
        &self,
        _token: &str,
        pub_key: &NodeKey,
        proxy: Option<&Proxy>,
    ) -> Result<NodeStatus> {
        self.record(Operation::NodeStatus, Some(pub_key), proxy)
            .resolve(Operation::NodeStatus)
    }

    async fn register_node(
        &self,
        _token: &str,
        pub_key: &NodeKey,
        request: &RegisterNodeRequest,
        proxy: Option<&Proxy>,
    ) -> Result<GatewayReply> {
        self.state.lock().registrations.push(request.clone());
        self.record(Operation::Register, Some(pub_key), proxy)
            .resolve(Operation::Register)
    }

    async fn start_session(
        &self,
        _token: &str,
        pub_key: &NodeKey,
        proxy: Option<&Proxy>,
    ) -> Result<GatewayReply> {
        self.record(Operation::StartSession, Some(pub_key), proxy)
            .resolve(Operation::StartSession)
    }

    async fn send_heartbeat(
        &self,
        _token: &str,
        pub_key: &NodeKey,
        payload: &SignedPayload,
        proxy: Option<&Proxy>,
    ) -> Result<GatewayReply> {
        self.state.lock().heartbeats.push(payload.clone());
        self.record(Operation::Heartbeat, Some(pub_key), proxy)
            .resolve(Operation::Heartbeat)
    }
}

// ============================================
// Tests
// ============================================
