// ============================================
// File: crates/bless-node/src/testing.rs
// ============================================
//! Shared fixtures for the node client's unit tests.

use std::sync::Arc;

use bless_common::{Account, Node, Proxy};
use bless_transport::mock::MockGateway;
use bless_transport::{GatewayClient, RetryPolicy};

use crate::proxy::ProxyPool;
use crate::reporter::MemorySink;
use crate::services::{LifecycleDeps, LifecycleTimings, NodeRuntime};

/// Mock gateway, proxy pool and memory sink wired together.
pub(crate) struct Harness {
    pub gateway: Arc<MockGateway>,
    pub sink: Arc<MemorySink>,
    pub deps: LifecycleDeps,
}

impl Harness {
    /// Builds a harness with `proxies` pool entries (zero means direct).
    pub fn new(retry: RetryPolicy, proxies: usize) -> Self {
        let gateway = Arc::new(MockGateway::new());
        let sink = Arc::new(MemorySink::new());
        let pool: Vec<Proxy> = (0..proxies)
            .map(|i| format!("10.0.0.{}:8080", i + 1).parse().unwrap())
            .collect();
        let deps = LifecycleDeps {
            client: Arc::new(GatewayClient::new(gateway.clone(), retry)),
            proxies: Arc::new(ProxyPool::new(pool)),
            sink: sink.clone(),
            timings: LifecycleTimings::default(),
        };
        Self {
            gateway,
            sink,
            deps,
        }
    }

    /// Runtime of the `index`-th node of `account`.
    pub fn runtime(&self, account: &Arc<Account>, index: usize) -> NodeRuntime {
        NodeRuntime::new(Arc::clone(account), account.nodes[index].clone(), &self.deps)
    }
}

/// Account with one node per key, hardware ids derived from the keys.
pub(crate) fn account(token: &str, secret: &str, keys: &[&str]) -> Arc<Account> {
    Arc::new(plain_account(token, secret, keys))
}

/// Same as [`account`], unwrapped.
pub(crate) fn plain_account(token: &str, secret: &str, keys: &[&str]) -> Account {
    let nodes = keys
        .iter()
        .map(|key| Node::new(*key, format!("hw-{key}")))
        .collect();
    Account::new(token, secret, nodes)
}
